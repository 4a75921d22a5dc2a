//! Form controls that mirror the data configuration.
//!
//! The form is abstract: anything that can get and set named string fields
//! implements [`ControlForm`]. Values go out with [`update_controls`] and come
//! back as a candidate viewport through [`read_controls`].

use crate::config::DataConfig;
use crate::error::{MrhError, MrhResult};
use crate::types::{GenomicPos, Viewport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FORM_FIELDS: [&str; 7] = ["dataset_id", "chrom1", "start1", "stop1", "chrom2", "start2", "stop2"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Hidden,
    Select { options: Vec<String> },
    Number { min: GenomicPos },
}

/// Description of one form field, enough to build the widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    pub name: String,
    pub label: Option<String>,
    pub kind: ControlKind,
    pub value: String,
    pub disabled: bool,
}

/// Build control descriptors for the current state.
///
/// chrom2 is hidden and follows chrom1. The chromosome select is disabled
/// when there is nothing to choose between.
pub fn control_specs(config: &DataConfig) -> Vec<ControlSpec> {
    let values = field_values(config);
    let chroms = config.source().available_chroms().to_vec();
    FORM_FIELDS
        .iter()
        .map(|&name| {
            let (kind, disabled) = match name {
                "dataset_id" | "chrom2" => (ControlKind::Hidden, false),
                "chrom1" => (
                    ControlKind::Select { options: chroms.clone() },
                    chroms.len() < 2,
                ),
                _ => (ControlKind::Number { min: 0 }, false),
            };
            ControlSpec {
                name: name.to_string(),
                label: control_label(name).map(str::to_string),
                kind,
                value: values.get(name).cloned().unwrap_or_default(),
                disabled,
            }
        })
        .collect()
}

fn control_label(name: &str) -> Option<&'static str> {
    match name {
        "chrom1" => Some("Chromosome"),
        "start1" => Some("Coordinate 1 start"),
        "stop1" => Some("Coordinate 1 stop"),
        "start2" => Some("Coordinate 2 start"),
        "stop2" => Some("Coordinate 2 stop"),
        _ => None,
    }
}

fn field_values(config: &DataConfig) -> BTreeMap<&'static str, String> {
    let vp = config.viewport();
    BTreeMap::from([
        ("dataset_id", config.dataset_id().to_string()),
        ("chrom1", vp.chrom1.clone()),
        ("start1", vp.start1.to_string()),
        ("stop1", vp.stop1.to_string()),
        ("chrom2", vp.chrom2.clone()),
        ("start2", vp.start2.to_string()),
        ("stop2", vp.stop2.to_string()),
    ])
}

pub trait ControlForm {
    fn get_field(&self, name: &str) -> Option<String>;
    fn set_field(&mut self, name: &str, value: &str);
}

/// Write the current configuration into the form.
pub fn update_controls(form: &mut dyn ControlForm, config: &DataConfig) {
    for (name, value) in field_values(config) {
        form.set_field(name, &value);
    }
}

/// Read a candidate viewport from the form. Nothing is clamped here.
pub fn read_controls(form: &dyn ControlForm) -> MrhResult<Viewport> {
    let text = |name: &str| -> MrhResult<String> {
        let value = form
            .get_field(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MrhError::MissingField(name.to_string()))?;
        Ok(value)
    };
    let number = |name: &str| -> MrhResult<GenomicPos> {
        let value = text(name)?;
        value.parse().map_err(|_| MrhError::invalid_field(name, value))
    };

    Ok(Viewport::new(
        text("chrom1")?,
        number("start1")?,
        number("stop1")?,
        text("chrom2")?,
        number("start2")?,
        number("stop2")?,
    ))
}

/// chrom2 follows chrom1 whenever chrom1 changes.
pub fn on_chrom1_changed(form: &mut dyn ControlForm) {
    if let Some(chrom) = form.get_field("chrom1") {
        form.set_field("chrom2", &chrom);
    }
}

/// In-memory form, used by the CLI and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    fields: BTreeMap<String, String>,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ControlForm for FormState {
    fn get_field(&self, name: &str) -> Option<String> {
        self.fields.get(name).cloned()
    }

    fn set_field(&mut self, name: &str, value: &str) {
        self.fields.insert(name.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{HeaderPolicy, Source};
    use crate::types::Header;

    fn config(chroms: &[&str]) -> DataConfig {
        let headers = chroms.iter().map(|c| Header::new(*c, 0, 10_000, 0.0, 1.0)).collect();
        let source = Source::new("ds1", headers).unwrap();
        DataConfig::new(source, Viewport::square(chroms[0], 100, 1100), HeaderPolicy::Chrom1).unwrap()
    }

    #[test]
    fn test_update_then_read_matches_viewport() {
        let cfg = config(&["chr1", "chr2"]);
        let mut form = FormState::new();
        update_controls(&mut form, &cfg);
        assert_eq!(form.get_field("dataset_id").as_deref(), Some("ds1"));
        assert_eq!(read_controls(&form).unwrap(), *cfg.viewport());
    }

    #[test]
    fn test_single_chrom_disables_selects() {
        let specs = control_specs(&config(&["chr1"]));
        let chrom1 = specs.iter().find(|s| s.name == "chrom1").unwrap();
        assert!(chrom1.disabled);
        let start1 = specs.iter().find(|s| s.name == "start1").unwrap();
        assert_eq!(start1.kind, ControlKind::Number { min: 0 });
        assert_eq!(start1.value, "100");

        let specs = control_specs(&config(&["chr1", "chr2"]));
        let chrom1 = specs.iter().find(|s| s.name == "chrom1").unwrap();
        assert!(!chrom1.disabled);
        assert_eq!(chrom1.label.as_deref(), Some("Chromosome"));
        let chrom2 = specs.iter().find(|s| s.name == "chrom2").unwrap();
        assert_eq!(chrom2.kind, ControlKind::Hidden);
    }

    #[test]
    fn test_read_rejects_bad_numbers() {
        let mut form = FormState::new();
        update_controls(&mut form, &config(&["chr1"]));
        form.set_field("start2", "12ab");
        assert!(matches!(read_controls(&form), Err(MrhError::InvalidField { .. })));

        form.set_field("start2", "  ");
        assert!(matches!(read_controls(&form), Err(MrhError::MissingField(_))));
    }

    #[test]
    fn test_out_of_range_form_values_are_rejected() {
        let mut cfg = config(&["chr1"]);
        let mut form = FormState::new();
        update_controls(&mut form, &cfg);
        form.set_field("start1", "-5");
        form.set_field("stop1", &i64::MAX.to_string());

        let candidate = read_controls(&form).unwrap();
        assert!(matches!(cfg.set_viewport(candidate), Err(MrhError::InvalidViewport(_))));
        assert_eq!(cfg.viewport(), &Viewport::square("chr1", 100, 1100));
    }

    #[test]
    fn test_chrom1_change_mirrors() {
        let mut form = FormState::new();
        update_controls(&mut form, &config(&["chr1", "chr2"]));
        form.set_field("chrom1", "chr2");
        on_chrom1_changed(&mut form);
        assert_eq!(form.get_field("chrom2").as_deref(), Some("chr2"));
    }
}
