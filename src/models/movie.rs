use serde::Serialize;
use std::fmt::Display;

/// A catalog entry
///
/// All fields are `'static` because the catalog is compiled into the binary
/// and never changes while the process runs.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Movie {
    pub title: &'static str,
    /// Brief plot summary, the text that gets embedded
    pub plot: &'static str,
    pub year: i32,
    pub director: &'static str,
    /// 1-10 rating
    pub rating: f64,
    pub genre: &'static str,
}

/// Value of a single metadata attribute
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Text(&'static str),
    Integer(i64),
    Float(f64),
}

impl Movie {
    /// Returns the metadata value the filter engine sees for `attribute`
    pub fn metadata(&self, attribute: Attribute) -> MetadataValue {
        match attribute {
            Attribute::Genre => MetadataValue::Text(self.genre),
            Attribute::Year => MetadataValue::Integer(self.year as i64),
            Attribute::Director => MetadataValue::Text(self.director),
            Attribute::Rating => MetadataValue::Float(self.rating),
        }
    }
}

/// Scalar type of a metadata attribute, as described to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Integer,
    Float,
}

impl Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributeType::String => write!(f, "string"),
            AttributeType::Integer => write!(f, "integer"),
            AttributeType::Float => write!(f, "float"),
        }
    }
}

/// Filterable metadata attributes of a movie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Genre,
    Year,
    Director,
    Rating,
}

impl Attribute {
    pub const ALL: [Attribute; 4] = [
        Attribute::Genre,
        Attribute::Year,
        Attribute::Director,
        Attribute::Rating,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Genre => "genre",
            Attribute::Year => "year",
            Attribute::Director => "director",
            Attribute::Rating => "rating",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Attribute::Genre => "The genre of the movie.",
            Attribute::Year => "The year the movie was released",
            Attribute::Director => "The name of the movie director",
            Attribute::Rating => "A 1-10 rating for the movie",
        }
    }

    pub fn value_type(&self) -> AttributeType {
        match self {
            Attribute::Genre | Attribute::Director => AttributeType::String,
            Attribute::Year => AttributeType::Integer,
            Attribute::Rating => AttributeType::Float,
        }
    }

    /// Looks up an attribute by the name the model uses
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }
}
