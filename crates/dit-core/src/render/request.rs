use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RequestError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Unknown plot mode '{0}'")]
    UnknownMode(String),
    #[error("Series {index} has {found} points, expected {expected}")]
    SeriesLength {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("Matrix of {rows}x{cols} cells does not span {y} y ticks by {x} x ticks")]
    MatrixShape {
        rows: usize,
        cols: usize,
        y: usize,
        x: usize,
    },
}

/// How the backend should draw the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotMode {
    Line,
    Stack,
    Scatter,
    Bar,
    Box,
    Violin,
    Imshow,
    Pcolormesh,
    #[serde(rename = "3d")]
    ThreeD,
    Contour,
    Ramachandran,
}

impl PlotMode {
    pub fn as_tag(&self) -> &'static str {
        match self {
            PlotMode::Line => "line",
            PlotMode::Stack => "stack",
            PlotMode::Scatter => "scatter",
            PlotMode::Bar => "bar",
            PlotMode::Box => "box",
            PlotMode::Violin => "violin",
            PlotMode::Imshow => "imshow",
            PlotMode::Pcolormesh => "pcolormesh",
            PlotMode::ThreeD => "3d",
            PlotMode::Contour => "contour",
            PlotMode::Ramachandran => "ramachandran",
        }
    }

    /// True for modes that draw a value matrix rather than curves.
    pub fn is_matrix(&self) -> bool {
        matches!(
            self,
            PlotMode::Imshow | PlotMode::Pcolormesh | PlotMode::ThreeD | PlotMode::Contour
        )
    }
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

impl FromStr for PlotMode {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(PlotMode::Line),
            "stack" => Ok(PlotMode::Stack),
            "scatter" => Ok(PlotMode::Scatter),
            "bar" => Ok(PlotMode::Bar),
            "box" => Ok(PlotMode::Box),
            "violin" => Ok(PlotMode::Violin),
            "imshow" => Ok(PlotMode::Imshow),
            "pcolormesh" => Ok(PlotMode::Pcolormesh),
            "3d" => Ok(PlotMode::ThreeD),
            "contour" => Ok(PlotMode::Contour),
            "ramachandran" => Ok(PlotMode::Ramachandran),
            other => Err(RequestError::UnknownMode(other.to_string())),
        }
    }
}

/// A complete, backend-agnostic description of one plot.
///
/// Curve modes read `xdata`/`ydata` (one series per entry of `ydata`, all
/// spanning `xdata`); matrix modes additionally read `zdata`, with `xdata`
/// and `ydata[0]` holding the column and row ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRequest {
    pub mode: PlotMode,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub z_label: String,
    pub legends: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_range: Option<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_precision: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_precision: Option<u32>,
    pub alpha: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colormap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<String>,
    pub interpolation_fold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar_location: Option<String>,
    pub xdata: Vec<f64>,
    pub ydata: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zdata: Option<Vec<Vec<f64>>>,
}

#[derive(Default)]
pub struct PlotRequestBuilder {
    mode: Option<PlotMode>,
    title: Option<String>,
    x_label: Option<String>,
    y_label: Option<String>,
    z_label: Option<String>,
    legends: Vec<String>,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    z_range: Option<(f64, f64)>,
    x_precision: Option<u32>,
    y_precision: Option<u32>,
    z_precision: Option<u32>,
    alpha: Option<f64>,
    colormap: Option<String>,
    interpolation: Option<String>,
    interpolation_fold: Option<u32>,
    legend_location: Option<String>,
    colorbar_location: Option<String>,
    xdata: Option<Vec<f64>>,
    ydata: Vec<Vec<f64>>,
    zdata: Option<Vec<Vec<f64>>>,
}

impl PlotRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: PlotMode) -> Self {
        self.mode = Some(mode);
        self
    }
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
    pub fn x_label(mut self, label: impl Into<String>) -> Self {
        self.x_label = Some(label.into());
        self
    }
    pub fn y_label(mut self, label: impl Into<String>) -> Self {
        self.y_label = Some(label.into());
        self
    }
    pub fn z_label(mut self, label: impl Into<String>) -> Self {
        self.z_label = Some(label.into());
        self
    }
    pub fn legends(mut self, legends: Vec<String>) -> Self {
        self.legends = legends;
        self
    }
    pub fn x_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.x_range = range;
        self
    }
    pub fn y_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.y_range = range;
        self
    }
    pub fn z_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.z_range = range;
        self
    }
    pub fn x_precision(mut self, precision: Option<u32>) -> Self {
        self.x_precision = precision;
        self
    }
    pub fn y_precision(mut self, precision: Option<u32>) -> Self {
        self.y_precision = precision;
        self
    }
    pub fn z_precision(mut self, precision: Option<u32>) -> Self {
        self.z_precision = precision;
        self
    }
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }
    pub fn colormap(mut self, colormap: Option<String>) -> Self {
        self.colormap = colormap;
        self
    }
    pub fn interpolation(mut self, method: Option<String>) -> Self {
        self.interpolation = method;
        self
    }
    pub fn interpolation_fold(mut self, fold: u32) -> Self {
        self.interpolation_fold = Some(fold);
        self
    }
    pub fn legend_location(mut self, location: Option<String>) -> Self {
        self.legend_location = location;
        self
    }
    pub fn colorbar_location(mut self, location: Option<String>) -> Self {
        self.colorbar_location = location;
        self
    }
    pub fn xdata(mut self, xdata: Vec<f64>) -> Self {
        self.xdata = Some(xdata);
        self
    }
    pub fn ydata(mut self, ydata: Vec<Vec<f64>>) -> Self {
        self.ydata = ydata;
        self
    }
    pub fn zdata(mut self, zdata: Option<Vec<Vec<f64>>>) -> Self {
        self.zdata = zdata;
        self
    }

    pub fn build(self) -> Result<PlotRequest, RequestError> {
        let mode = self.mode.ok_or(RequestError::MissingParameter("mode"))?;
        let xdata = self.xdata.ok_or(RequestError::MissingParameter("xdata"))?;
        if self.ydata.is_empty() {
            return Err(RequestError::MissingParameter("ydata"));
        }

        match &self.zdata {
            None => {
                for (index, series) in self.ydata.iter().enumerate() {
                    if series.len() != xdata.len() {
                        return Err(RequestError::SeriesLength {
                            index,
                            expected: xdata.len(),
                            found: series.len(),
                        });
                    }
                }
            }
            Some(matrix) => {
                let rows_fit = matrix.len() == self.ydata[0].len();
                let cols_fit = matrix.iter().all(|row| row.len() == xdata.len());
                if !rows_fit || !cols_fit {
                    return Err(RequestError::MatrixShape {
                        rows: matrix.len(),
                        cols: matrix.first().map_or(0, Vec::len),
                        y: self.ydata[0].len(),
                        x: xdata.len(),
                    });
                }
            }
        }

        Ok(PlotRequest {
            mode,
            title: self.title.unwrap_or_default(),
            x_label: self.x_label.unwrap_or_default(),
            y_label: self.y_label.unwrap_or_default(),
            z_label: self.z_label.unwrap_or_default(),
            legends: self.legends,
            x_range: self.x_range,
            y_range: self.y_range,
            z_range: self.z_range,
            x_precision: self.x_precision,
            y_precision: self.y_precision,
            z_precision: self.z_precision,
            alpha: self.alpha.unwrap_or(1.0),
            colormap: self.colormap,
            interpolation: self.interpolation,
            interpolation_fold: self.interpolation_fold.unwrap_or(10),
            legend_location: self.legend_location,
            colorbar_location: self.colorbar_location,
            xdata,
            ydata: self.ydata,
            zdata: self.zdata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_mode_x_and_y() {
        assert_eq!(
            PlotRequestBuilder::new().build().unwrap_err(),
            RequestError::MissingParameter("mode")
        );
        assert_eq!(
            PlotRequestBuilder::new()
                .mode(PlotMode::Line)
                .build()
                .unwrap_err(),
            RequestError::MissingParameter("xdata")
        );
        assert_eq!(
            PlotRequestBuilder::new()
                .mode(PlotMode::Line)
                .xdata(vec![0.0])
                .build()
                .unwrap_err(),
            RequestError::MissingParameter("ydata")
        );
    }

    #[test]
    fn defaults_fill_the_optional_fields() {
        let request = PlotRequestBuilder::new()
            .mode(PlotMode::Line)
            .xdata(vec![0.0, 1.0])
            .ydata(vec![vec![1.0, 2.0]])
            .build()
            .unwrap();
        assert_eq!(request.alpha, 1.0);
        assert_eq!(request.interpolation_fold, 10);
        assert!(request.title.is_empty());
        assert!(request.colormap.is_none());
    }

    #[test]
    fn curve_series_must_span_the_x_axis() {
        let err = PlotRequestBuilder::new()
            .mode(PlotMode::Line)
            .xdata(vec![0.0, 1.0])
            .ydata(vec![vec![1.0, 2.0], vec![3.0]])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RequestError::SeriesLength {
                index: 1,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn matrix_must_span_both_tick_axes() {
        let err = PlotRequestBuilder::new()
            .mode(PlotMode::Imshow)
            .xdata(vec![0.0, 1.0, 2.0])
            .ydata(vec![vec![10.0, 20.0]])
            .zdata(Some(vec![vec![1.0, 2.0, 3.0]]))
            .build()
            .unwrap_err();
        assert!(matches!(err, RequestError::MatrixShape { rows: 1, y: 2, .. }));
    }

    #[test]
    fn mode_tags_round_trip_through_strings() {
        for mode in [
            PlotMode::Line,
            PlotMode::Stack,
            PlotMode::Scatter,
            PlotMode::Bar,
            PlotMode::Box,
            PlotMode::Violin,
            PlotMode::Imshow,
            PlotMode::Pcolormesh,
            PlotMode::ThreeD,
            PlotMode::Contour,
            PlotMode::Ramachandran,
        ] {
            assert_eq!(mode.as_tag().parse::<PlotMode>().unwrap(), mode);
        }
        assert_eq!(PlotMode::ThreeD.as_tag(), "3d");
        assert!(matches!(
            "spiral".parse::<PlotMode>(),
            Err(RequestError::UnknownMode(_))
        ));
    }
}
