use std::fmt::{self, Display, Formatter};

use libsqlite3_sys::{SQLITE_BLOB, SQLITE_FLOAT, SQLITE_INTEGER, SQLITE_NULL, SQLITE_TEXT};

/// A value in one of SQLite's native storage classes.
///
/// This is what gets bound to statement parameters and what is read back out of a
/// result column before any declared-type decoding takes place.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

/// The storage class of a [`Value`], without its payload.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StorageClass {
    Null,
    Integer,
    Float,
    Text,
    Blob,
}

impl StorageClass {
    pub fn name(&self) -> &'static str {
        match self {
            StorageClass::Null => "NULL",
            StorageClass::Integer => "INTEGER",
            StorageClass::Float => "REAL",
            StorageClass::Text => "TEXT",
            StorageClass::Blob => "BLOB",
        }
    }

    pub(crate) fn from_code(code: i32) -> Option<Self> {
        // https://sqlite.org/c3ref/c_blob.html
        match code {
            SQLITE_INTEGER => Some(StorageClass::Integer),
            SQLITE_FLOAT => Some(StorageClass::Float),
            SQLITE_BLOB => Some(StorageClass::Blob),
            SQLITE_NULL => Some(StorageClass::Null),
            SQLITE_TEXT => Some(StorageClass::Text),
            _ => None,
        }
    }
}

impl Display for StorageClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl Value {
    pub fn storage_class(&self) -> StorageClass {
        match self {
            Value::Null => StorageClass::Null,
            Value::Integer(_) => StorageClass::Integer,
            Value::Float(_) => StorageClass::Float,
            Value::Text(_) => StorageClass::Text,
            Value::Blob(_) => StorageClass::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A short textual rendering of the value, used in decode error reports.
    pub(crate) fn render(&self) -> String {
        match self {
            Value::Null => "NULL".into(),
            Value::Integer(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Text(v) => v.clone(),
            Value::Blob(v) => format!("<{} byte blob>", v.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_unknown() {
        assert!(StorageClass::from_code(9999).is_none());
        assert_eq!(StorageClass::from_code(SQLITE_TEXT), Some(StorageClass::Text));
    }
}
