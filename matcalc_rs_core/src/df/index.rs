use std::{collections::HashMap, fmt, sync::OnceLock};

use ndarray::{ArcArray1, Axis};

use crate::error::{MatcalcError, Result};

/// A row or column label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Label {
    Num(i64),
    Str(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Num(v) => write!(f, "{v}"),
            Label::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Label::Str(v.to_string())
    }
}
impl From<String> for Label {
    fn from(v: String) -> Self {
        Label::Str(v)
    }
}
impl From<&String> for Label {
    fn from(v: &String) -> Self {
        Label::Str(v.clone())
    }
}
impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Num(v)
    }
}

/// `A`, `B`, ..., `Z`, `AA`, `AB`, ...
pub fn excel_col_name(mut i: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (i % 26) as u8);
        if i < 26 {
            break;
        }
        i = i / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Ordered labels of one axis.
///
/// The label -> position map is built on first lookup. Every "mutation"
/// returns a new [`Index`], which starts with an empty map, so a stale
/// lookup can never be observed.
#[derive(Debug, Clone)]
pub struct Index {
    labels: ArcArray1<Label>,
    name: String,
    lookup: OnceLock<HashMap<Label, usize>>,
}

impl Default for Index {
    fn default() -> Self {
        Index::new(Vec::new())
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

impl<L: Into<Label>> FromIterator<L> for Index {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Index::new(iter.into_iter().map(Into::into).collect())
    }
}

impl Index {
    pub fn new(labels: Vec<Label>) -> Self {
        Self {
            labels: ArcArray1::from_vec(labels),
            name: String::new(),
            lookup: OnceLock::new(),
        }
    }

    /// `1..=len`, the default row index of a table without row names
    pub fn range(len: usize) -> Self {
        (1..=len as i64).collect()
    }

    /// `A, B, ...`, the default column index of a table without a header
    pub fn excel(len: usize) -> Self {
        (0..len).map(excel_col_name).collect()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[inline]
    pub fn get(&self, pos: usize) -> Option<&Label> {
        self.labels.get(pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn strs(&self) -> Vec<String> {
        self.labels.iter().map(ToString::to_string).collect()
    }

    fn lookup(&self) -> &HashMap<Label, usize> {
        self.lookup.get_or_init(|| {
            let mut map = HashMap::with_capacity(self.labels.len());
            for (i, label) in self.labels.iter().enumerate() {
                map.entry(label.clone()).or_insert(i);
            }
            map
        })
    }

    /// position of the first occurrence of `label`
    pub fn find(&self, label: &Label) -> Option<usize> {
        self.lookup().get(label).copied()
    }

    pub fn contains(&self, label: &Label) -> bool {
        self.find(label).is_some()
    }

    pub fn position(&self, label: &Label) -> Result<usize> {
        self.find(label)
            .ok_or_else(|| MatcalcError::KeyNotFound(label.to_string()))
    }

    pub fn check_bounds(&self, positions: &[usize]) -> Result<()> {
        let len = self.len();
        match positions.iter().find(|&&p| p >= len) {
            Some(&index) => Err(MatcalcError::IndexOutOfBounds { index, len }),
            None => Ok(()),
        }
    }

    /// the labels at `positions`, in that order
    pub fn filter(&self, positions: &[usize]) -> Result<Self> {
        self.check_bounds(positions)?;
        Ok(Self {
            labels: self.labels.select(Axis(0), positions).into_shared(),
            name: self.name.clone(),
            lookup: OnceLock::new(),
        })
    }

    pub fn push(&self, label: Label) -> Self {
        let mut labels = self.labels.to_vec();
        labels.push(label);
        Index::new(labels).with_name(self.name.clone())
    }

    pub fn concat(indices: &[&Index]) -> Self {
        indices
            .iter()
            .flat_map(|index| index.iter().cloned())
            .collect()
    }

    /// `label` if it is free, otherwise the first free `label_1`, `label_2`, ...
    pub fn unique_label(&self, label: Label) -> Label {
        if !self.contains(&label) {
            return label;
        }
        (1..)
            .map(|k| Label::Str(format!("{label}_{k}")))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or(label)
    }
}
