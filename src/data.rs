//! Observation tables: ordered named columns of numeric values or choice
//! labels, validated against a model before estimation.
//!
//! Loading tables from CSV or other formats is left to the caller; this type
//! only fixes the column order the serializer and data writer rely on.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MnlError, Result};
use crate::model::ChoiceModel;

/// One column of an observation table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Numeric values (variables, availabilities).
    Numeric(Vec<f64>),
    /// Alternative labels (the choice column).
    Labels(Vec<String>),
}

impl Column {
    fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Labels(values) => values.len(),
        }
    }
}

/// A table of observations with a fixed column order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Observations {
    order: Vec<String>,
    columns: HashMap<String, Column>,
}

impl Observations {
    /// Number of observations (rows).
    pub fn len(&self) -> usize {
        self.order
            .first()
            .map(|name| self.columns[name].len())
            .unwrap_or(0)
    }

    /// Whether the table holds no observations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> &[String] {
        &self.order
    }

    /// The column called `name`, if present.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// The numeric values of `name`, if it is a numeric column.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        match self.columns.get(name) {
            Some(Column::Numeric(values)) => Some(values),
            _ => None,
        }
    }

    /// The labels of `name`, if it is a label column.
    pub fn labels(&self, name: &str) -> Option<&[String]> {
        match self.columns.get(name) {
            Some(Column::Labels(values)) => Some(values),
            _ => None,
        }
    }

    /// Ensures every field the model requires is present in the table.
    pub fn validate_for(&self, model: &ChoiceModel) -> Result<()> {
        let mut required = vec![model.choice_column()];
        required.extend(model.availability_fields());
        required.extend(model.all_variable_fields());

        for field in required {
            if !self.columns.contains_key(field) {
                return Err(MnlError::MissingField {
                    field: field.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Builder that checks column lengths before constructing [`Observations`].
#[derive(Debug, Default)]
pub struct ObservationsBuilder {
    order: Vec<String>,
    columns: HashMap<String, Column>,
}

impl ObservationsBuilder {
    /// Starts an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a numeric column.
    pub fn numeric(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        let name = name.into();
        self.order.push(name.clone());
        self.columns.insert(name, Column::Numeric(values));
        self
    }

    /// Appends a label column.
    pub fn labels(mut self, name: impl Into<String>, values: Vec<String>) -> Self {
        let name = name.into();
        self.order.push(name.clone());
        self.columns.insert(name, Column::Labels(values));
        self
    }

    /// Finalizes construction after checking all columns share one length.
    pub fn build(self) -> Result<Observations> {
        let expected = self
            .order
            .first()
            .map(|name| self.columns[name].len())
            .unwrap_or(0);
        for name in &self.order {
            let found = self.columns[name].len();
            if found != expected {
                return Err(MnlError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected,
                    found,
                });
            }
        }
        Ok(Observations {
            order: self.order,
            columns: self.columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChoiceModelBuilder;

    fn two_alternative_model() -> ChoiceModel {
        ChoiceModelBuilder::new(
            "Example",
            vec!["car".to_string(), "bus".to_string()],
            "choice",
        )
        .availability("car", "avail_car")
        .availability("bus", "avail_bus")
        .variable("cost")
        .parameter("p_cost")
        .utility_expression("car", "p_cost*cost")
        .utility_expression("bus", "p_cost*cost")
        .build()
        .unwrap()
    }

    #[test]
    fn builder_preserves_column_order() {
        let table = ObservationsBuilder::new()
            .numeric("cost", vec![1.0, 2.0])
            .labels("choice", vec!["car".to_string(), "bus".to_string()])
            .build()
            .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names(), ["cost", "choice"]);
        assert_eq!(table.numeric("cost"), Some(&[1.0, 2.0][..]));
        assert!(table.labels("cost").is_none());
    }

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let result = ObservationsBuilder::new()
            .numeric("cost", vec![1.0, 2.0])
            .numeric("avail_car", vec![1.0])
            .build();

        assert!(matches!(
            result,
            Err(MnlError::ColumnLengthMismatch { column, .. }) if column == "avail_car"
        ));
    }

    #[test]
    fn validation_requires_model_fields() {
        let model = two_alternative_model();
        let table = ObservationsBuilder::new()
            .numeric("cost", vec![1.0])
            .numeric("avail_car", vec![1.0])
            .labels("choice", vec!["car".to_string()])
            .build()
            .unwrap();

        let result = table.validate_for(&model);
        assert!(matches!(
            result,
            Err(MnlError::MissingField { field }) if field == "avail_bus"
        ));
    }
}
