//! Volume indicators

use crate::indicators::math;
use crate::models::AssetSeries;

pub const VOLUME_SMA_PERIOD: usize = 20;

/// Last bar's volume relative to its trailing moving average.
///
/// 1.0 means average participation; above ~1.5 the original analysis calls
/// it expansion, below ~0.5 contraction.
pub fn volume_ratio(series: &AssetSeries, period: usize) -> Option<f64> {
    let volumes = series.volumes();
    let avg = math::sma(&volumes, period)?;
    if avg <= 0.0 {
        return None;
    }
    let last = *volumes.last()?;
    Some(last / avg)
}
