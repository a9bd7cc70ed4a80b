use crate::analysis::rama::{RamaAnalysis, RAMA_CLASSES};
use crate::core::formats::xpm::{XpmKind, XpmMatrix};
use crate::core::formats::xvg::XvgData;
use crate::render::backend::RenderError;
use crate::render::request::{PlotMode, PlotRequest, PlotRequestBuilder};
use crate::render::text::unescape_grace;
use tracing::warn;

/// Options of the curve-plot builders (line, stack, scatter, bar, box, violin).
#[derive(Debug, Clone)]
pub struct CurveOptions {
    pub mode: PlotMode,
    /// Y columns to draw; empty means every column behind x.
    pub columns: Vec<usize>,
    /// Row window `[begin, end)`; `end = None` runs to the last row.
    pub begin: usize,
    pub end: Option<usize>,
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub alpha: Option<f64>,
    pub legend_location: Option<String>,
}

impl Default for CurveOptions {
    fn default() -> Self {
        Self {
            mode: PlotMode::Line,
            columns: Vec::new(),
            begin: 0,
            end: None,
            x_range: None,
            y_range: None,
            alpha: None,
            legend_location: None,
        }
    }
}

/// Options of the matrix-plot builder (imshow, pcolormesh, 3d, contour).
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    pub mode: PlotMode,
    pub colormap: Option<String>,
    pub interpolation: Option<String>,
    pub interpolation_fold: Option<u32>,
    pub z_range: Option<(f64, f64)>,
    pub z_precision: Option<u32>,
    pub alpha: Option<f64>,
    pub colorbar_location: Option<String>,
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            mode: PlotMode::Imshow,
            colormap: None,
            interpolation: None,
            interpolation_fold: None,
            z_range: None,
            z_precision: None,
            alpha: None,
            colorbar_location: None,
        }
    }
}

/// Packages selected columns of a table as one curve plot.
pub fn xvg_curves(table: &XvgData, options: &CurveOptions) -> Result<PlotRequest, RenderError> {
    if options.mode.is_matrix() || options.mode == PlotMode::Ramachandran {
        return Err(RenderError::InvalidSelection(format!(
            "mode '{}' does not draw curves",
            options.mode
        )));
    }
    let end = options.end.unwrap_or(table.row_count);
    if options.begin >= end || end > table.row_count {
        return Err(RenderError::InvalidSelection(format!(
            "row window [{}, {}) is not within {} rows",
            options.begin, end, table.row_count
        )));
    }
    let columns = if options.columns.is_empty() {
        (1..table.column_count).collect()
    } else {
        options.columns.clone()
    };
    if columns.is_empty() {
        return Err(RenderError::InvalidSelection(
            "table has no y columns to draw".into(),
        ));
    }
    for &column in &columns {
        if column >= table.column_count {
            return Err(RenderError::InvalidSelection(format!(
                "column {} is not in a table of {} columns",
                column, table.column_count
            )));
        }
    }

    let xdata = table.columns[0][options.begin..end].to_vec();
    let ydata = columns
        .iter()
        .map(|&c| table.columns[c][options.begin..end].to_vec())
        .collect();
    let legends = columns
        .iter()
        .map(|&c| unescape_grace(&table.heads[c]))
        .collect();

    let mut builder = PlotRequestBuilder::new()
        .mode(options.mode)
        .title(unescape_grace(&table.title))
        .x_label(unescape_grace(&table.x_label))
        .y_label(unescape_grace(&table.y_label))
        .legends(legends)
        .x_range(options.x_range)
        .y_range(options.y_range)
        .legend_location(options.legend_location.clone())
        .xdata(xdata)
        .ydata(ydata);
    if let Some(alpha) = options.alpha {
        builder = builder.alpha(alpha);
    }
    Ok(builder.build()?)
}

/// Packages a matrix as one heatmap-family plot; x/y ticks ride along as
/// `xdata` and `ydata[0]`.
pub fn matrix_heatmap(
    matrix: &XpmMatrix,
    options: &HeatmapOptions,
) -> Result<PlotRequest, RenderError> {
    if !options.mode.is_matrix() {
        return Err(RenderError::InvalidSelection(format!(
            "mode '{}' does not draw a matrix",
            options.mode
        )));
    }
    let interpolation = if options.interpolation.is_some() && matrix.kind == XpmKind::Discrete {
        warn!("interpolation does not apply to a discrete matrix, ignoring it");
        None
    } else {
        options.interpolation.clone()
    };

    let mut builder = PlotRequestBuilder::new()
        .mode(options.mode)
        .title(unescape_grace(&matrix.title))
        .x_label(unescape_grace(&matrix.x_label))
        .y_label(unescape_grace(&matrix.y_label))
        .z_label(unescape_grace(&matrix.legend))
        .z_range(options.z_range)
        .z_precision(options.z_precision)
        .colormap(options.colormap.clone())
        .interpolation(interpolation)
        .colorbar_location(options.colorbar_location.clone())
        .xdata(matrix.x_axis.clone())
        .ydata(vec![matrix.y_axis.clone()])
        .zdata(Some(matrix.value_matrix.clone()));
    if let Some(fold) = options.interpolation_fold {
        builder = builder.interpolation_fold(fold);
    }
    if let Some(alpha) = options.alpha {
        builder = builder.alpha(alpha);
    }
    Ok(builder.build()?)
}

/// Packages a Ramachandran classification as one scatter request.
///
/// Every class/outlier group with points becomes its own series over the
/// shared φ sequence, with `NaN` masking the points of the other groups.
pub fn ramachandran(analysis: &RamaAnalysis) -> Result<PlotRequest, RenderError> {
    let xdata: Vec<f64> = analysis.points.iter().map(|p| p.phi).collect();
    let mut legends = Vec::new();
    let mut ydata = Vec::new();
    for class in RAMA_CLASSES {
        for outlier in [false, true] {
            let count = analysis
                .points
                .iter()
                .filter(|p| p.class == class && p.outlier == outlier)
                .count();
            if count == 0 {
                continue;
            }
            legends.push(if outlier {
                format!("{} outlier ({})", class, count)
            } else {
                format!("{} ({})", class, count)
            });
            ydata.push(
                analysis
                    .points
                    .iter()
                    .map(|p| {
                        if p.class == class && p.outlier == outlier {
                            p.psi
                        } else {
                            f64::NAN
                        }
                    })
                    .collect(),
            );
        }
    }

    let request = PlotRequestBuilder::new()
        .mode(PlotMode::Ramachandran)
        .title("Ramachandran Plot")
        .x_label("Phi (degree)")
        .y_label("Psi (degree)")
        .x_range(Some((-180.0, 180.0)))
        .y_range(Some((-180.0, 180.0)))
        .legends(legends)
        .xdata(xdata)
        .ydata(ydata)
        .build()?;
    Ok(request)
}
