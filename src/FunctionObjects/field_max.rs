use super::FunctionObjectError;
use crate::Mesh::fields::{FieldLookup, VolScalarField};
use crate::config::ConfigError;
use log::info;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMaxConfig {
    pub fields: Vec<String>,
    #[serde(default)]
    pub restart_on_restart: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMax {
    field_names: Vec<String>,
    max_field_names: Vec<String>,
    restart_on_restart: bool,
    max_fields: Vec<Option<VolScalarField>>,
}

impl FieldMax {
    pub fn new(field_names: Vec<String>, restart_on_restart: bool) -> Self {
        let max_field_names = field_names.iter().map(|n| format!("{}Max", n)).collect();
        let n = field_names.len();
        Self {
            field_names,
            max_field_names,
            restart_on_restart,
            max_fields: vec![None; n],
        }
    }

    pub fn from_config(coeffs: &Value) -> Result<Self, ConfigError> {
        let cfg: FieldMaxConfig = serde_json::from_value(coeffs.clone())?;
        if cfg.fields.is_empty() {
            return Err(ConfigError::invalid("fieldMax", "no fields listed"));
        }
        Ok(Self::new(cfg.fields, cfg.restart_on_restart))
    }

    pub fn restart_on_restart(&self) -> bool {
        self.restart_on_restart
    }

    /// Forgets the stored maxima
    pub fn restart(&mut self) {
        self.max_fields.iter_mut().for_each(|f| *f = None);
    }

    /// Folds the current value of every field into its running maximum
    pub fn execute(&mut self, source: &dyn FieldLookup) -> Result<(), FunctionObjectError> {
        for (i, name) in self.field_names.iter().enumerate() {
            let current = source
                .lookup_scalar(name)
                .ok_or_else(|| FunctionObjectError::UnknownField {
                    object: "fieldMax",
                    field: name.clone(),
                })?;
            let slot = &mut self.max_fields[i];
            match slot {
                Some(stored) => {
                    let expected = stored.internal().len();
                    if current.internal().len() != expected {
                        return Err(FunctionObjectError::SizeChanged {
                            field: name.clone(),
                            expected,
                            got: current.internal().len(),
                        });
                    }
                    let internal = stored.internal().sup(current.internal());
                    *stored.internal_mut() = internal;
                    for patchi in 0..stored.n_patches() {
                        let b = stored.boundary(patchi).sup(current.boundary(patchi));
                        *stored.boundary_mut(patchi) = b;
                    }
                }
                None => {
                    *slot = Some(current.with_name(&self.max_field_names[i]));
                }
            }
        }
        Ok(())
    }

    pub fn max_field(&self, field: &str) -> Option<&VolScalarField> {
        self.field_names
            .iter()
            .position(|n| n == field)
            .and_then(|i| self.max_fields[i].as_ref())
    }

    pub fn summary_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(row!["field", "max field", "global max", "cell"]);
        for (name, max) in self.field_names.iter().zip(&self.max_fields) {
            match max {
                Some(f) => {
                    let celli = f.internal().imax();
                    table.add_row(row![name, f.name(), format!("{:.6e}", f.get(celli)), celli]);
                }
                None => {
                    table.add_row(row![name, "-", "-", "-"]);
                }
            }
        }
        table
    }

    /// Logs the global maxima
    pub fn write(&self) {
        for (name, max) in self.field_names.iter().zip(&self.max_fields) {
            if let Some(f) = max {
                info!("fieldMax: max({}) = {:e}", name, f.max());
            }
        }
    }
}
