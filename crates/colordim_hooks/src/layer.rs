//! Layer handles and layer selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use colordim_core::{CoreError, Result};

/// Handle to one layer of a flattened model.
///
/// Two handles refer to the same layer when their `index` is equal; the name
/// and description are for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Position in the flattened layer list.
    pub index: usize,
    /// Short name, e.g. `fc1`.
    pub name: String,
    /// Longer description, e.g. `Linear(d_input=4, d_output=32)`.
    pub description: String,
}

impl LayerInfo {
    /// Create a handle whose description is its name.
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            index,
            description: name.clone(),
            name,
        }
    }

    /// Set the layer description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl PartialEq for LayerInfo {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for LayerInfo {}

impl std::hash::Hash for LayerInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Display for LayerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}

/// A model that can be flattened into an ordered list of layers.
///
/// The order must match the `index` a model passes to
/// [`ForwardObserver::observe`](crate::ForwardObserver::observe).
pub trait LayerTree {
    /// All layers in forward order.
    fn layers(&self) -> Vec<LayerInfo>;
}

/// Which layers to monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerSelection {
    /// Every layer of the flattened model.
    #[default]
    All,
    /// Only the last layer (the model output).
    Last,
    /// Explicit indices into the flattened model.
    Indices(Vec<usize>),
}

impl LayerSelection {
    /// Resolve the selection against a flattened layer list.
    ///
    /// Duplicate indices are kept once, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidLayer`] for an index past the end of `layers`,
    /// and [`CoreError::Other`] if nothing would be monitored.
    pub fn resolve(&self, layers: &[LayerInfo]) -> Result<Vec<LayerInfo>> {
        let selected: Vec<LayerInfo> = match self {
            LayerSelection::All => layers.to_vec(),
            LayerSelection::Last => layers.last().cloned().into_iter().collect(),
            LayerSelection::Indices(indices) => {
                let mut selected: Vec<LayerInfo> = Vec::with_capacity(indices.len());
                for &index in indices {
                    let layer = layers.get(index).ok_or(CoreError::InvalidLayer {
                        index,
                        n_layers: layers.len(),
                    })?;
                    if !selected.contains(layer) {
                        selected.push(layer.clone());
                    }
                }
                selected
            }
        };

        if selected.is_empty() {
            return Err(CoreError::Other("no layers selected for monitoring".to_string()));
        }
        Ok(selected)
    }
}

impl FromStr for LayerSelection {
    type Err = CoreError;

    /// Parse `all`, `last`, or a comma-separated index list such as `0,2,4`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(LayerSelection::All),
            "last" => Ok(LayerSelection::Last),
            list => list
                .split(',')
                .map(|part| {
                    part.trim().parse::<usize>().map_err(|_| {
                        CoreError::Other(format!("invalid layer index '{}'", part.trim()))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(LayerSelection::Indices),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers() -> Vec<LayerInfo> {
        vec![
            LayerInfo::new(0, "fc1").with_description("Linear(d_input=4, d_output=8)"),
            LayerInfo::new(1, "relu1"),
            LayerInfo::new(2, "fc2"),
        ]
    }

    #[test]
    fn test_layer_identity_is_index() {
        let a = LayerInfo::new(3, "fc");
        let b = LayerInfo::new(3, "renamed").with_description("other");
        assert_eq!(a, b);
        assert_ne!(a, LayerInfo::new(4, "fc"));
    }

    #[test]
    fn test_resolve_all_and_last() {
        let all = LayerSelection::All.resolve(&layers()).unwrap();
        assert_eq!(all.len(), 3);

        let last = LayerSelection::Last.resolve(&layers()).unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].name, "fc2");
    }

    #[test]
    fn test_resolve_indices() {
        let selected = LayerSelection::Indices(vec![2, 0, 2]).resolve(&layers()).unwrap();
        let names: Vec<&str> = selected.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["fc2", "fc1"]);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let err = LayerSelection::Indices(vec![5]).resolve(&layers()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLayer { index: 5, n_layers: 3 }));
    }

    #[test]
    fn test_resolve_empty_model() {
        assert!(LayerSelection::All.resolve(&[]).is_err());
        assert!(LayerSelection::Indices(vec![]).resolve(&layers()).is_err());
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!("all".parse::<LayerSelection>().unwrap(), LayerSelection::All);
        assert_eq!("Last".parse::<LayerSelection>().unwrap(), LayerSelection::Last);
        assert_eq!(
            "0, 2,4".parse::<LayerSelection>().unwrap(),
            LayerSelection::Indices(vec![0, 2, 4])
        );
        assert!("1,x".parse::<LayerSelection>().is_err());
    }
}
