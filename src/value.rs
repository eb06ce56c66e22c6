use std::fmt::{self, Display, Formatter};

/// a scalar or sequence, the payload half of a [`PieceAttribute`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Real(f64),
    Str(String),
    Bool(bool),
    Ints(Vec<i64>),
    Reals(Vec<f64>),
    Strs(Vec<String>),
    Bools(Vec<bool>),
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Real(v) => write!(f, "{v}"),
            Self::Str(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Ints(v) => write_seq(f, v),
            Self::Reals(v) => write_seq(f, v),
            Self::Strs(v) => write_seq(f, v),
            Self::Bools(v) => write_seq(f, v),
        }
    }
}

fn write_seq<T: Display>(f: &mut Formatter, xs: &[T]) -> fmt::Result {
    write!(f, "{{")?;
    for (i, x) in xs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{x}")?;
    }
    write!(f, "}}")
}

/// a (name, value) pair. equality is structural.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PieceAttribute {
    name: String,
    value: AttributeValue,
}

impl PieceAttribute {
    pub fn new(name: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

impl Display for PieceAttribute {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}({})", self.name, self.value)
    }
}

/// an unordered set of [`PieceAttribute`]s with unique names.
///
/// stored canonically: sorted by attribute name, deduplicated keeping the
/// last-declared entry for a repeated name. equality is structural.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PieceValue {
    attributes: Vec<PieceAttribute>,
}

impl PieceValue {
    pub fn new(attributes: Vec<PieceAttribute>) -> Self {
        let mut canonical: Vec<PieceAttribute> = Vec::with_capacity(attributes.len());
        for attr in attributes {
            canonical.retain(|a: &PieceAttribute| a.name() != attr.name());
            canonical.push(attr);
        }
        canonical.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            attributes: canonical,
        }
    }

    pub fn attributes(&self) -> &[PieceAttribute] {
        &self.attributes
    }

    pub fn get_attribute(&self, name: &str) -> Option<&PieceAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    /// true if some attribute on this value equals `attribute`.
    pub fn has(&self, attribute: &PieceAttribute) -> bool {
        self.get_attribute(attribute.name())
            .is_some_and(|a| a == attribute)
    }
}

impl Display for PieceValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (i, attr) in self.attributes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{attr}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_order_and_dedups_by_name() {
        let v1 = PieceValue::new(vec![
            PieceAttribute::new("rank", AttributeValue::Str("K".into())),
            PieceAttribute::new("suit", AttributeValue::Str("spade".into())),
        ]);
        let v2 = PieceValue::new(vec![
            PieceAttribute::new("suit", AttributeValue::Str("spade".into())),
            PieceAttribute::new("rank", AttributeValue::Str("K".into())),
        ]);
        assert_eq!(v1, v2);
    }

    #[test]
    fn last_declared_entry_wins() {
        let v = PieceValue::new(vec![
            PieceAttribute::new("rank", AttributeValue::Str("J".into())),
            PieceAttribute::new("rank", AttributeValue::Str("K".into())),
        ]);
        assert_eq!(v.attributes().len(), 1);
        assert_eq!(
            v.get_attribute("rank").unwrap().value(),
            &AttributeValue::Str("K".into())
        );
    }

    #[test]
    fn display_matches_wire_projection() {
        assert_eq!(
            PieceAttribute::new("pot", AttributeValue::Int(2)).to_string(),
            "pot(2)"
        );
        assert_eq!(
            PieceAttribute::new("money", AttributeValue::Ints(vec![-1, -1])).to_string(),
            "money({-1, -1})"
        );
        assert_eq!(
            PieceAttribute::new("folded", AttributeValue::Bool(true)).to_string(),
            "folded(true)"
        );
    }
}
