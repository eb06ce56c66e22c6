/// a player identity. non-negative ids are real seats; two sentinels carry
/// special meaning throughout the move algebra and the driver.
pub type PlayerId = i32;

/// the distinguished player id whose "actions" model chance (dealing, draws).
pub const CHANCE: PlayerId = -1;

/// reserved by games for "no such player yet" bookkeeping in a variable
/// (e.g. Kuhn Poker's `first_better` before anyone has bet).
pub const INVALID: PlayerId = -2;
