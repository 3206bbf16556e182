use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("Feature vector for record '{id}' has length {got}, expected {expected}")]
    FeatureLengthMismatch {
        id: String,
        expected: usize,
        got: usize,
    },
}

/// One `(identifier, feature vector, label)` row of a [`Dataset`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub id: &'a str,
    pub features: &'a [f64],
    pub label: f64,
}

/// An ordered collection of featurized records sharing one feature length.
///
/// The feature length is fixed at construction and enforced on every push, so
/// every consumer can rely on rectangular data. Datasets are never mutated by
/// the pipeline stages; splitting and normalization produce fresh instances.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    feature_len: usize,
    ids: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl Dataset {
    pub fn new(feature_len: usize) -> Self {
        Self {
            feature_len,
            ids: Vec::new(),
            features: Vec::new(),
            labels: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        id: impl Into<String>,
        features: Vec<f64>,
        label: f64,
    ) -> Result<(), DatasetError> {
        let id = id.into();
        if features.len() != self.feature_len {
            return Err(DatasetError::FeatureLengthMismatch {
                id,
                expected: self.feature_len,
                got: features.len(),
            });
        }
        self.ids.push(id);
        self.features.push(features);
        self.labels.push(label);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn feature_len(&self) -> usize {
        self.feature_len
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn features(&self, index: usize) -> &[f64] {
        &self.features[index]
    }

    pub fn row(&self, index: usize) -> Row<'_> {
        Row {
            id: &self.ids[index],
            features: &self.features[index],
            label: self.labels[index],
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.len()).map(|i| self.row(i))
    }

    /// Builds a new dataset from the given row indices, preserving order.
    ///
    /// Indices must be in bounds; callers derive them from `0..len()`.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let mut out = Self::new(self.feature_len);
        for &i in indices {
            out.ids.push(self.ids[i].clone());
            out.features.push(self.features[i].clone());
            out.labels.push(self.labels[i]);
        }
        out
    }
}
