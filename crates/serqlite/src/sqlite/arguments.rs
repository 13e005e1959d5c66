use crate::{
    Value,
    encode::Encode,
    error::{Error, Result},
    sqlite::statement::StatementHandle,
};

/// An ordered list of positional bind parameters.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Arguments {
    pub(crate) values: Vec<Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T>(&mut self, value: T)
    where
        T: Encode,
    {
        self.values.push(value.encode());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Bind every value, in order, to a freshly reset statement.
    ///
    /// The number of values must equal the statement's parameter count.
    pub(crate) fn bind(&self, handle: &mut StatementHandle) -> Result<()> {
        let expected = handle.bind_parameter_count();
        if expected != self.values.len() {
            return Err(Error::BindArity {
                expected,
                actual: self.values.len(),
            });
        }

        // Parameter indexes start at 1.
        for (i, value) in self.values.iter().enumerate() {
            handle.bind(i + 1, value)?;
        }
        Ok(())
    }
}

impl<T: Encode> FromIterator<T> for Arguments {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(Encode::encode).collect(),
        }
    }
}
