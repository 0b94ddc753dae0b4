//! Drawing Surfaces
//! Named plot regions in the window, each holding at most one chart.

use crate::charts::ChartConfig;
use crate::data::RowRecord;
use crate::stats::Forecast;
use log::debug;
use std::collections::BTreeMap;
use thiserror::Error;

/// Surface for the actual savings bar chart.
pub const SAVINGS_CHART: &str = "savingsChart";
/// Surface for the predicted savings line chart.
pub const PREDICTED_SAVINGS_CHART: &str = "predictedSavingsChart";

/// Display order of the standard surfaces.
pub const STANDARD_SURFACES: [&str; 2] = [SAVINGS_CHART, PREDICTED_SAVINGS_CHART];

#[derive(Error, Debug, PartialEq)]
pub enum SurfaceError {
    #[error("Drawing surface '{0}' does not exist")]
    Missing(String),
}

/// A chart bound to a surface. `generation` changes on every mount.
#[derive(Debug, Clone, PartialEq)]
pub struct MountedChart {
    pub config: ChartConfig,
    pub generation: u64,
}

pub struct SurfaceRegistry {
    surfaces: BTreeMap<String, Option<MountedChart>>,
    next_generation: u64,
}

impl Default for SurfaceRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl SurfaceRegistry {
    /// Registry with the two standard chart surfaces.
    pub fn standard() -> Self {
        Self::with_surfaces(&STANDARD_SURFACES)
    }

    pub fn with_surfaces(ids: &[&str]) -> Self {
        Self {
            surfaces: ids.iter().map(|id| (id.to_string(), None)).collect(),
            next_generation: 1,
        }
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.surfaces.contains_key(id)
    }

    /// Bind `config` to a surface, destroying whatever chart was there before.
    pub fn mount(
        &mut self,
        id: &str,
        config: ChartConfig,
    ) -> Result<Option<MountedChart>, SurfaceError> {
        let slot = self
            .surfaces
            .get_mut(id)
            .ok_or_else(|| SurfaceError::Missing(id.to_string()))?;

        let generation = self.next_generation;
        self.next_generation += 1;
        debug!("Mounting chart on '{}' (generation {})", id, generation);

        Ok(slot.replace(MountedChart { config, generation }))
    }

    pub fn get(&self, id: &str) -> Result<Option<&MountedChart>, SurfaceError> {
        self.surfaces
            .get(id)
            .map(|slot| slot.as_ref())
            .ok_or_else(|| SurfaceError::Missing(id.to_string()))
    }

    /// All surfaces that currently hold a chart.
    pub fn mounted(&self) -> impl Iterator<Item = (&str, &MountedChart)> {
        self.surfaces
            .iter()
            .filter_map(|(id, slot)| slot.as_ref().map(|chart| (id.as_str(), chart)))
    }

    pub fn has_charts(&self) -> bool {
        self.mounted().next().is_some()
    }

    /// Unbind every chart, keeping the surfaces.
    pub fn clear(&mut self) {
        self.surfaces.values_mut().for_each(|slot| *slot = None);
    }
}

/// Redraw both savings charts from the given rows. With no rows both surfaces are left empty.
/// A forecast adds its trend projection to the predicted savings chart.
pub fn render_charts(
    surfaces: &mut SurfaceRegistry,
    rows: &[RowRecord],
    forecast: Option<&Forecast>,
    label_prefix: &str,
) -> Result<(), SurfaceError> {
    // Check both targets first so a missing one leaves the other untouched.
    for id in STANDARD_SURFACES {
        if !surfaces.is_registered(id) {
            return Err(SurfaceError::Missing(id.to_string()));
        }
    }

    if rows.is_empty() {
        surfaces.clear();
        return Ok(());
    }

    let mut predicted = ChartConfig::predicted_savings(rows, label_prefix);
    if let Some(forecast) = forecast {
        predicted = predicted.with_trend(rows, forecast, label_prefix);
    }

    surfaces.mount(SAVINGS_CHART, ChartConfig::actual_savings(rows, label_prefix))?;
    surfaces.mount(PREDICTED_SAVINGS_CHART, predicted)?;
    Ok(())
}
