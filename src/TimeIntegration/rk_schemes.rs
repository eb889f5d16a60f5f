use crate::CompressibleSystem::StorageDescriptor;
use crate::config::ConfigError;

pub const RK_SCHEMES: [&str; 4] = ["euler", "rk2_ssp", "rk3_ssp", "rk4"];

/// Explicit scheme in Shu–Osher form. Row i of `a` and `b` has i + 1 entries.
#[derive(Debug, Clone, PartialEq)]
pub struct RkScheme {
    pub name: String,
    pub a: Vec<Vec<f64>>,
    pub b: Vec<Vec<f64>>,
}

impl RkScheme {
    /// Builds a scheme from a user table after checking its triangular shape
    pub fn new(name: &str, a: Vec<Vec<f64>>, b: Vec<Vec<f64>>) -> Result<Self, ConfigError> {
        if a.is_empty() || a.len() != b.len() {
            return Err(ConfigError::invalid(
                "timeScheme",
                format!("'{}' needs the same non-zero number of a and b rows", name),
            ));
        }
        for (i, (ai, bi)) in a.iter().zip(&b).enumerate() {
            if ai.len() != i + 1 || bi.len() != i + 1 {
                return Err(ConfigError::invalid(
                    "timeScheme",
                    format!("row {} of '{}' must have {} coefficients", i, name, i + 1),
                ));
            }
            if ai.iter().chain(bi).any(|c| !c.is_finite()) {
                return Err(ConfigError::invalid(
                    "timeScheme",
                    format!("row {} of '{}' has a non-finite coefficient", i, name),
                ));
            }
        }
        Ok(Self {
            name: name.to_string(),
            a,
            b,
        })
    }

    pub fn euler() -> Self {
        Self {
            name: "euler".to_string(),
            a: vec![vec![1.0]],
            b: vec![vec![1.0]],
        }
    }

    /// Heun's method, strong-stability preserving
    pub fn rk2_ssp() -> Self {
        Self {
            name: "rk2_ssp".to_string(),
            a: vec![vec![1.0], vec![0.5, 0.5]],
            b: vec![vec![1.0], vec![0.0, 0.5]],
        }
    }

    /// Shu–Osher third-order SSP scheme
    pub fn rk3_ssp() -> Self {
        Self {
            name: "rk3_ssp".to_string(),
            a: vec![vec![1.0], vec![0.75, 0.25], vec![1.0 / 3.0, 0.0, 2.0 / 3.0]],
            b: vec![vec![1.0], vec![0.0, 0.25], vec![0.0, 0.0, 2.0 / 3.0]],
        }
    }

    /// Classic fourth-order Runge–Kutta
    pub fn rk4() -> Self {
        Self {
            name: "rk4".to_string(),
            a: vec![
                vec![1.0],
                vec![1.0, 0.0],
                vec![1.0, 0.0, 0.0],
                vec![1.0, 0.0, 0.0, 0.0],
            ],
            b: vec![
                vec![0.5],
                vec![0.0, 0.5],
                vec![0.0, 0.0, 1.0],
                vec![1.0 / 6.0, 1.0 / 3.0, 1.0 / 3.0, 1.0 / 6.0],
            ],
        }
    }

    pub fn by_name(name: &str) -> Result<Self, ConfigError> {
        match name {
            "euler" => Ok(Self::euler()),
            "rk2_ssp" => Ok(Self::rk2_ssp()),
            "rk3_ssp" => Ok(Self::rk3_ssp()),
            "rk4" => Ok(Self::rk4()),
            _ => Err(ConfigError::unknown_model("timeScheme", name, &RK_SCHEMES)),
        }
    }

    pub fn n_stages(&self) -> usize {
        self.a.len()
    }

    /// Slot j keeps its entry state if a later stage blends it, and its rate if a later
    /// stage uses it.
    pub fn storage_descriptors(&self) -> Vec<StorageDescriptor> {
        let n = self.n_stages();
        (0..n)
            .map(|j| {
                let old = (j + 1..n).any(|i| self.a[i][j] != 0.0);
                let delta = (j + 1..n).any(|i| self.b[i][j] != 0.0);
                StorageDescriptor::from_flags(old, delta)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Applies a scheme to du/dt = λu through the same blend the system uses
    fn amplification(scheme: &RkScheme, z: f64) -> f64 {
        let n = scheme.n_stages();
        let mut old = vec![0.0; n];
        let mut delta = vec![0.0; n];
        let mut u = 1.0;
        for i in 0..n {
            old[i] = u;
            delta[i] = z * u;
            let mut next = 0.0;
            for j in 0..=i {
                next += scheme.a[i][j] * old[j] + scheme.b[i][j] * delta[j];
            }
            u = next;
        }
        u
    }

    #[test]
    fn schemes_match_exponential_to_their_order() {
        let z: f64 = 0.1;
        let taylor = |order: usize| (0..=order).map(|k| z.powi(k as i32) / (1..=k).product::<usize>() as f64).sum::<f64>();
        for (name, order) in [("euler", 1), ("rk2_ssp", 2), ("rk3_ssp", 3), ("rk4", 4)] {
            let scheme = RkScheme::by_name(name).unwrap();
            assert_relative_eq!(amplification(&scheme, z), taylor(order), max_relative = 1e-14);
        }
    }

    #[test]
    fn rows_keep_stage_consistency() {
        for name in RK_SCHEMES {
            let s = RkScheme::by_name(name).unwrap();
            for row in &s.a {
                assert_relative_eq!(row.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn descriptors_follow_tables() {
        use StorageDescriptor::*;
        assert_eq!(RkScheme::euler().storage_descriptors(), vec![None]);
        assert_eq!(RkScheme::rk2_ssp().storage_descriptors(), vec![OldOnly, None]);
        assert_eq!(RkScheme::rk4().storage_descriptors(), vec![Both, DeltaOnly, DeltaOnly, None]);
    }

    #[test]
    fn rejects_malformed_tables() {
        assert!(RkScheme::new("bad", vec![vec![1.0], vec![1.0]], vec![vec![1.0], vec![0.5, 0.5]]).is_err());
        assert!(RkScheme::new("bad", vec![], vec![]).is_err());
        assert!(RkScheme::new("ok", vec![vec![1.0]], vec![vec![1.0]]).is_ok());
        assert!(matches!(RkScheme::by_name("rk5"), Err(ConfigError::UnknownModel { .. })));
    }
}
