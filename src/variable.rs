use std::fmt::{self, Display, Formatter};

/// the tagged value a [`Variable`] carries. same shape as an attribute
/// value, kept as a separate type since variables are named-global
/// bookkeeping (pot, scores, flags) rather than per-piece data.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    Str(String),
    Int(i64),
    Real(f64),
    Bool(bool),
    Strs(Vec<String>),
    Ints(Vec<i64>),
    Reals(Vec<f64>),
    Bools(Vec<bool>),
}

impl Display for VariableValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        fn seq<T: Display>(f: &mut Formatter, xs: &[T]) -> fmt::Result {
            write!(f, "{{")?;
            for (i, x) in xs.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{x}")?;
            }
            write!(f, "}}")
        }
        match self {
            Self::Str(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Strs(v) => seq(f, v),
            Self::Ints(v) => seq(f, v),
            Self::Reals(v) => seq(f, v),
            Self::Bools(v) => seq(f, v),
        }
    }
}

/// a named, overwritable slot of game-specific bookkeeping (pot, scores,
/// flags) carried by a belief state.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: VariableValue,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: VariableValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> &VariableValue {
        &self.value
    }
}

/// diagnostic-only wire projection: `name(scalar)` or `name({e1, e2, ...})`.
/// not required for correctness, used for driver/CLI verbose output.
impl Display for Variable {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_projection() {
        assert_eq!(Variable::new("pot", VariableValue::Int(2)).to_string(), "pot(2)");
        assert_eq!(
            Variable::new("folded", VariableValue::Bool(false)).to_string(),
            "folded(false)"
        );
    }

    #[test]
    fn sequence_projection() {
        let v = Variable::new("players_money", VariableValue::Ints(vec![-1, -1]));
        assert_eq!(v.to_string(), "players_money({-1, -1})");
    }
}
