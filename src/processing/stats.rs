// Descriptive statistics for data processing
// Author: Gabriel Demetrios Lafis

use std::collections::HashMap;

use serde::Serialize;

use crate::data::{DataSet, DataType, Field, Row, Schema, Value};

/// Summary of one numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub median: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

/// Summary of one non-numeric column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: Option<usize>,
}

/// Descriptive statistics of a dataset.
///
/// Numeric columns are summarized when there are any; otherwise every other
/// column gets a categorical summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
}

impl Summary {
    /// Whether there was nothing to summarize
    pub fn is_empty(&self) -> bool {
        self.numeric.is_empty() && self.categorical.is_empty()
    }

    /// Lay the summary out as a table: one row per statistic, one column per
    /// summarized column
    pub fn to_dataset(&self) -> DataSet {
        let float = |v: Option<f64>| v.map_or(Value::Null, Value::Float);

        let column_type = if self.numeric.is_empty() {
            DataType::Text
        } else {
            DataType::Float
        };

        let (columns, rows): (Vec<String>, Vec<(&str, Vec<Value>)>) = if !self.numeric.is_empty() {
            let s = &self.numeric;
            let stat = |f: &dyn Fn(&NumericSummary) -> Value| s.iter().map(f).collect::<Vec<_>>();
            (
                s.iter().map(|c| c.column.clone()).collect(),
                vec![
                    ("count", stat(&|c| Value::Float(c.count as f64))),
                    ("mean", stat(&|c| float(c.mean))),
                    ("std", stat(&|c| float(c.std))),
                    ("min", stat(&|c| float(c.min))),
                    ("25%", stat(&|c| float(c.q25))),
                    ("50%", stat(&|c| float(c.median))),
                    ("75%", stat(&|c| float(c.q75))),
                    ("max", stat(&|c| float(c.max))),
                ],
            )
        } else {
            let s = &self.categorical;
            let stat = |f: &dyn Fn(&CategoricalSummary) -> Value| s.iter().map(f).collect::<Vec<_>>();
            (
                s.iter().map(|c| c.column.clone()).collect(),
                vec![
                    ("count", stat(&|c| Value::Integer(c.count as i64))),
                    ("unique", stat(&|c| Value::Integer(c.unique as i64))),
                    ("top", stat(&|c| c.top.clone().map_or(Value::Null, Value::Text))),
                    ("freq", stat(&|c| c.freq.map_or(Value::Null, |f| Value::Integer(f as i64)))),
                ],
            )
        };

        let mut fields = vec![Field::new("statistic".to_string(), DataType::Text, false)];
        fields.extend(
            columns
                .into_iter()
                .map(|name| Field::new(name, column_type, true)),
        );

        let mut table = DataSet::new(Schema::new(fields));
        table.data = rows
            .into_iter()
            .map(|(label, values)| {
                let mut cells = vec![Value::Text(label.to_string())];
                cells.extend(values);
                Row::new(cells)
            })
            .collect();
        table
    }
}

/// Compute descriptive statistics for a dataset
pub fn describe(input: &DataSet) -> Summary {
    let numeric: Vec<NumericSummary> = input
        .schema
        .fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.data_type.is_numeric())
        .map(|(i, field)| {
            let values: Vec<f64> = input.column_values(i).filter_map(Value::as_f64).collect();
            summarize_numeric(&field.name, &values)
        })
        .collect();

    if !numeric.is_empty() {
        return Summary {
            numeric,
            categorical: Vec::new(),
        };
    }

    let categorical = input
        .schema
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| summarize_categorical(&field.name, input.column_values(i)))
        .collect();

    Summary {
        numeric,
        categorical,
    }
}

fn summarize_numeric(column: &str, values: &[f64]) -> NumericSummary {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    NumericSummary {
        column: column.to_string(),
        count: values.len(),
        mean: compute_mean(values),
        std: compute_std_dev(values),
        min: sorted.first().copied(),
        q25: compute_quantile(&sorted, 0.25),
        median: compute_quantile(&sorted, 0.5),
        q75: compute_quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

fn summarize_categorical<'a, I>(column: &str, values: I) -> CategoricalSummary
where
    I: Iterator<Item = &'a Value>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();
    let mut count = 0;

    for value in values.filter(|v| !v.is_null()) {
        count += 1;
        let key = value.to_string();
        let entry = counts.entry(key.clone()).or_insert(0);
        if *entry == 0 {
            order.push(key);
        }
        *entry += 1;
    }

    // Ties go to the value seen first
    let mut top: Option<(&String, usize)> = None;
    for key in &order {
        let n = counts[key];
        if top.map_or(true, |(_, best)| n > best) {
            top = Some((key, n));
        }
    }

    CategoricalSummary {
        column: column.to_string(),
        count,
        unique: order.len(),
        top: top.map(|(k, _)| k.clone()),
        freq: top.map(|(_, n)| n),
    }
}

/// Compute mean of values
fn compute_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Compute sample standard deviation of values (n - 1 denominator)
fn compute_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let mean = compute_mean(values)?;
    let variance = values
        .iter()
        .map(|&x| (x - mean).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;

    Some(variance.sqrt())
}

/// Compute quantile of sorted values with linear interpolation
fn compute_quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let pos = q * (sorted.len() - 1) as f64;
    let idx = pos.floor() as usize;
    let frac = pos - idx as f64;

    if idx + 1 < sorted.len() {
        Some(sorted[idx] + frac * (sorted[idx + 1] - sorted[idx]))
    } else {
        Some(sorted[idx])
    }
}
