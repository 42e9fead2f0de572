use std::path::Path;

use indexmap::IndexMap;

use crate::error::{RelError, Result};

/// Raw pedigree input: three parallel columns of equal length.
///
/// Parent values of `None` (or the `"0"`/`""`/`"NA"` sentinel, which
/// normalizes to `None`) indicate unknown parents. Rows are kept in the
/// order they were supplied; ordering is the completion step's job.
#[derive(Debug, Clone, Default)]
pub struct PedigreeRows {
    pub labels: Vec<String>,
    pub sires: Vec<Option<String>>,
    pub dams: Vec<Option<String>>,
}

impl PedigreeRows {
    /// Build rows from (label, sire, dam) triples.
    pub fn from_triples(triples: &[(&str, Option<&str>, Option<&str>)]) -> Self {
        let mut rows = Self::default();
        for &(label, sire, dam) in triples {
            rows.labels.push(label.to_string());
            rows.sires.push(sire.and_then(parse_parent));
            rows.dams.push(dam.and_then(parse_parent));
        }
        rows
    }

    /// Read pedigree rows from a CSV file.
    ///
    /// Expected columns (header required): `id`, `sire`, `dam`. Unknown
    /// parents are coded as `"0"`, `""`, or `"NA"`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or columns are missing.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(csv::Trim::All)
            .from_path(path.as_ref())?;

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_lowercase()).collect();

        let col = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| RelError::Validation(format!("CSV missing '{}' column", name)))
        };
        let id_col = col("id")?;
        let sire_col = col("sire")?;
        let dam_col = col("dam")?;

        let mut rows = Self::default();
        for record in reader.records() {
            let record = record?;
            let field = |c: usize| -> Result<&str> {
                record
                    .get(c)
                    .ok_or_else(|| RelError::Validation("short CSV row".to_string()))
            };
            rows.labels.push(field(id_col)?.to_string());
            rows.sires.push(parse_parent(field(sire_col)?));
            rows.dams.push(parse_parent(field(dam_col)?));
        }
        Ok(rows)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Validate and freeze the rows into a [`PedigreeStore`].
    pub fn into_store(self) -> Result<PedigreeStore> {
        PedigreeStore::from_rows(&self)
    }
}

/// Validated, immutable pedigree.
///
/// Individuals are mapped to dense 0-based ids in label order; the label↔id
/// map is a bijection built once at construction. Known parent ids are
/// always strictly smaller than their child's id: a parent listed at or
/// after its child is stored as unknown (construction never reorders rows —
/// run [`complete`](crate::pedigree::complete) first for arbitrary input
/// order). Once built, a store is never mutated; derived quantities
/// (gene-flow factors, inbreeding, relationship matrices) are pure functions
/// of it and may be computed concurrently.
#[derive(Debug, Clone)]
pub struct PedigreeStore {
    labels: Vec<String>,
    index_of: IndexMap<String, usize>,
    sires: Vec<Option<usize>>,
    dams: Vec<Option<usize>>,
}

impl PedigreeStore {
    /// Validate raw rows and build a store.
    ///
    /// # Errors
    /// `RelError::Validation` on mismatched column lengths, a reserved
    /// sentinel used as a label, duplicate labels, or a parent label that
    /// does not occur in the label column.
    pub fn from_rows(rows: &PedigreeRows) -> Result<Self> {
        let n = rows.labels.len();
        if rows.sires.len() != n || rows.dams.len() != n {
            return Err(RelError::Validation(format!(
                "column lengths differ: {} labels, {} sires, {} dams",
                n,
                rows.sires.len(),
                rows.dams.len()
            )));
        }

        let mut index_of = IndexMap::with_capacity(n);
        for (i, label) in rows.labels.iter().enumerate() {
            if is_unknown_code(label) {
                return Err(RelError::Validation(format!(
                    "label '{}' at row {} is reserved for unknown parents",
                    label, i
                )));
            }
            if index_of.insert(label.clone(), i).is_some() {
                return Err(RelError::Validation(format!("duplicate label '{}'", label)));
            }
        }

        let resolve = |parent: &Option<String>, child: usize| -> Result<Option<usize>> {
            let Some(p) = parent.as_deref().and_then(parse_parent) else {
                return Ok(None);
            };
            let id = *index_of.get(&p).ok_or_else(|| {
                RelError::Validation(format!(
                    "parent '{}' of '{}' does not occur in the label column",
                    p, rows.labels[child]
                ))
            })?;
            // A parent at or after its child cannot be encoded in the
            // triangular factors; it is stored as unknown here and repaired
            // by completion, which reorders rows by generation.
            Ok((id < child).then_some(id))
        };

        let mut sires = Vec::with_capacity(n);
        let mut dams = Vec::with_capacity(n);
        for i in 0..n {
            sires.push(resolve(&rows.sires[i], i)?);
            dams.push(resolve(&rows.dams[i], i)?);
        }

        Ok(Self {
            labels: rows.labels.clone(),
            index_of,
            sires,
            dams,
        })
    }

    /// Number of individuals.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// External label of the individual with id `i`.
    ///
    /// # Panics
    /// Panics if `i` is out of bounds.
    pub fn label(&self, i: usize) -> &str {
        &self.labels[i]
    }

    /// All labels, in id order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Dense id of an external label, if present.
    pub fn id_of(&self, label: &str) -> Option<usize> {
        self.index_of.get(label).copied()
    }

    /// Sire id of individual `i`, or `None` if unknown.
    pub fn sire(&self, i: usize) -> Option<usize> {
        self.sires[i]
    }

    /// Dam id of individual `i`, or `None` if unknown.
    pub fn dam(&self, i: usize) -> Option<usize> {
        self.dams[i]
    }

    /// Resolve a batch of external labels to ids, preserving order.
    ///
    /// # Errors
    /// `RelError::UnknownLabels` listing every offender if any label is
    /// absent; `RelError::Validation` on duplicates (never silently
    /// deduplicated).
    pub fn resolve_labels(&self, labs: &[&str]) -> Result<Vec<usize>> {
        let unknown: Vec<String> = labs
            .iter()
            .filter(|&&l| !self.index_of.contains_key(l))
            .map(|l| l.to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(RelError::UnknownLabels(unknown));
        }

        let mut seen = vec![false; self.len()];
        let mut ids = Vec::with_capacity(labs.len());
        for l in labs {
            let id = self.index_of[*l];
            if seen[id] {
                return Err(RelError::Validation(format!("duplicate label '{}'", l)));
            }
            seen[id] = true;
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Parse a parent field, returning `None` for the unknown-parent sentinel.
///
/// Unknown parents are coded as `"0"`, `""`, or `"NA"` (any case).
pub(crate) fn parse_parent(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if is_unknown_code(trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn is_unknown_code(s: &str) -> bool {
    s.is_empty() || s == "0" || s.eq_ignore_ascii_case("na")
}
