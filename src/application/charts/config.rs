// Typed Chart.js configuration - serializes to the option tree the
// front-end chart library consumes
use crate::domain::history::TimeUnit;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
}

/// Named Y axes (plus the shared X axis). Serialized as the scale keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AxisId {
    #[serde(rename = "x")]
    X,
    #[serde(rename = "y")]
    Y,
    #[serde(rename = "y_temp")]
    Temperature,
    #[serde(rename = "y_humid")]
    Humidity,
    #[serde(rename = "y_light")]
    Light,
    #[serde(rename = "y_soil")]
    Soil,
    #[serde(rename = "y_soil_raw")]
    SoilRaw,
    #[serde(rename = "y_soil_pf")]
    SoilCapacitance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Left,
    Right,
    Top,
    Bottom,
}

/// Area fill mode of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fill {
    #[default]
    None,
    /// Fill up to the next dataset (`"+1"`); used for band lower edges.
    ToNext,
    /// Fill down to the axis origin.
    Origin,
}

impl Serialize for Fill {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Fill::None => serializer.serialize_bool(false),
            Fill::ToNext => serializer.serialize_str("+1"),
            Fill::Origin => serializer.serialize_bool(true),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub border_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(rename = "yAxisID", skip_serializing_if = "Option::is_none")]
    pub y_axis_id: Option<AxisId>,
    pub tension: f64,
    pub point_radius: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub border_dash: Vec<u8>,
    pub fill: Fill,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

pub const TRANSPARENT: &str = "transparent";

impl Dataset {
    /// A plain metric line.
    pub fn line(label: impl Into<String>, color: &str, axis: AxisId, data: Vec<Option<f64>>) -> Self {
        Self {
            label: label.into(),
            data,
            border_color: color.to_string(),
            background_color: None,
            y_axis_id: Some(axis),
            tension: 0.2,
            point_radius: 0.0,
            border_width: None,
            border_dash: Vec::new(),
            fill: Fill::None,
            hidden: false,
        }
    }

    /// Invisible lower edge of a band, filled up to the following dataset.
    pub fn band_lower(label: impl Into<String>, fill_color: &str, axis: AxisId, data: Vec<Option<f64>>) -> Self {
        Self {
            background_color: Some(fill_color.to_string()),
            fill: Fill::ToNext,
            tension: 0.0,
            ..Self::line(label, TRANSPARENT, axis, data)
        }
    }

    /// Invisible upper edge of a band.
    pub fn band_upper(label: impl Into<String>, fill_color: &str, axis: AxisId, data: Vec<Option<f64>>) -> Self {
        Self {
            background_color: Some(fill_color.to_string()),
            tension: 0.0,
            ..Self::line(label, TRANSPARENT, axis, data)
        }
    }

    /// Dashed horizontal limit line.
    pub fn dashed(label: impl Into<String>, color: &str, axis: AxisId, data: Vec<Option<f64>>) -> Self {
        Self {
            border_width: Some(2.0),
            border_dash: vec![5, 5],
            tension: 0.0,
            ..Self::line(label, color, axis, data)
        }
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = tension;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.border_width = Some(width);
        self
    }

    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    pub fn filled(mut self, background: &str) -> Self {
        self.background_color = Some(background.to_string());
        self.fill = Fill::Origin;
        self
    }

    pub fn without_axis(mut self) -> Self {
        self.y_axis_id = None;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleKind {
    Time,
    Category,
    Linear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTitle {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    pub draw_on_chart_area: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeScale {
    pub unit: TimeUnit,
    pub tooltip_format: String,
}

/// Tick label formatting understood by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TickFormat {
    /// 1500 -> "1.5k"
    Thousands,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticks {
    pub format: TickFormat,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ScaleKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<AxisTitle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<TimeScale>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticks: Option<Ticks>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Axis {
    pub fn time(unit: TimeUnit, tooltip_format: &str) -> Self {
        Self {
            kind: Some(ScaleKind::Time),
            time: Some(TimeScale {
                unit,
                tooltip_format: tooltip_format.to_string(),
            }),
            ..Default::default()
        }
    }

    /// The primary axis: left side, with gridlines.
    pub fn primary(title: &str) -> Self {
        Self {
            position: Some(Position::Left),
            title: Some(AxisTitle {
                display: true,
                text: title.to_string(),
            }),
            ..Default::default()
        }
    }

    /// Secondary axes sit on the right and draw no gridlines of their own.
    pub fn secondary(title: &str) -> Self {
        Self {
            position: Some(Position::Right),
            grid: Some(Grid {
                draw_on_chart_area: false,
            }),
            ..Self::primary(title)
        }
    }

    pub fn titled(title: &str) -> Self {
        Self {
            title: Some(AxisTitle {
                display: true,
                text: title.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_ticks(mut self, format: TickFormat) -> Self {
        self.ticks = Some(Ticks { format });
        self
    }
}

/// Substring rule that keeps overlay datasets out of legend and tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelFilter {
    pub exclude_labels_containing: Vec<String>,
}

impl LabelFilter {
    pub fn excluding(patterns: &[&str]) -> Self {
        Self {
            exclude_labels_containing: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn admits(&self, label: &str) -> bool {
        !self
            .exclude_labels_containing
            .iter()
            .any(|p| label.contains(p.as_str()))
    }
}

/// Overlay labels: growth-phase band edges, min/max band edges and lethal lines.
pub const OVERLAY_PATTERNS: [&str; 5] = ["Lower", "Upper", "Min", "Max", "Lethal"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Legend {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<LabelFilter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<LabelFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPosition {
    Start,
    End,
}

/// Horizontal annotation line (threshold marker).
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: String,
    pub value: f64,
    pub color: String,
    pub label: String,
    pub label_position: LabelPosition,
}

impl Serialize for Annotation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Label<'a> {
            content: &'a str,
            display: bool,
            position: LabelPosition,
        }

        let mut map = serializer.serialize_map(Some(7))?;
        map.serialize_entry("type", "line")?;
        map.serialize_entry("yMin", &self.value)?;
        map.serialize_entry("yMax", &self.value)?;
        map.serialize_entry("borderColor", &self.color)?;
        map.serialize_entry("borderWidth", &2)?;
        map.serialize_entry("borderDash", &[6, 6])?;
        map.serialize_entry(
            "label",
            &Label {
                content: &self.label,
                display: true,
                position: self.label_position,
            },
        )?;
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations(pub Vec<Annotation>);

impl Serialize for Annotations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut outer = serializer.serialize_map(Some(1))?;
        let by_id: BTreeMap<&str, &Annotation> = self.0.iter().map(|a| (a.id.as_str(), a)).collect();
        outer.serialize_entry("annotations", &by_id)?;
        outer.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plugins {
    pub legend: Legend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<Tooltip>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotations>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interaction {
    pub mode: &'static str,
    pub intersect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOptions {
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
    pub scales: BTreeMap<AxisId, Axis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
    pub plugins: Plugins,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartConfig {
    pub fn line(labels: Vec<String>) -> Self {
        Self {
            kind: ChartKind::Line,
            data: ChartData {
                labels,
                datasets: Vec::new(),
            },
            options: ChartOptions {
                responsive: true,
                maintain_aspect_ratio: false,
                scales: BTreeMap::new(),
                interaction: None,
                plugins: Plugins {
                    legend: Legend {
                        position: None,
                        filter: None,
                    },
                    tooltip: None,
                    annotation: None,
                },
            },
        }
    }

    pub fn push(&mut self, dataset: Dataset) {
        self.data.datasets.push(dataset);
    }

    pub fn set_axis(&mut self, id: AxisId, axis: Axis) {
        self.options.scales.insert(id, axis);
    }

    /// Registers the axis only if no dataset group created it before.
    pub fn ensure_axis(&mut self, id: AxisId, axis: impl FnOnce() -> Axis) {
        self.options.scales.entry(id).or_insert_with(axis);
    }

    pub fn axis(&self, id: AxisId) -> Option<&Axis> {
        self.options.scales.get(&id)
    }

    pub fn axis_ids(&self) -> Vec<AxisId> {
        self.options.scales.keys().copied().collect()
    }

    pub fn dataset(&self, label: &str) -> Option<&Dataset> {
        self.data.datasets.iter().find(|d| d.label == label)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.data.datasets.iter().map(|d| d.label.as_str()).collect()
    }

    /// Hover interaction across all datasets at one X position.
    pub fn index_interaction(&mut self) {
        self.options.interaction = Some(Interaction {
            mode: "index",
            intersect: false,
        });
    }

    pub fn legend_at(&mut self, position: Position) {
        self.options.plugins.legend.position = Some(position);
    }

    /// Keeps overlay datasets out of both legend and tooltip.
    pub fn filter_overlays(&mut self, filter: LabelFilter) {
        self.options.plugins.legend.filter = Some(filter.clone());
        self.options.plugins.tooltip = Some(Tooltip {
            filter: Some(filter),
        });
    }

    /// Labels that the legend will display.
    pub fn legend_labels(&self) -> Vec<&str> {
        let filter = self.options.plugins.legend.filter.as_ref();
        self.data
            .datasets
            .iter()
            .map(|d| d.label.as_str())
            .filter(|label| filter.is_none_or(|f| f.admits(label)))
            .collect()
    }

    pub fn set_annotations(&mut self, annotations: Vec<Annotation>) {
        self.options.plugins.annotation = Some(Annotations(annotations));
    }

    pub fn annotations(&self) -> &[Annotation] {
        self.options
            .plugins
            .annotation
            .as_ref()
            .map(|a| a.0.as_slice())
            .unwrap_or_default()
    }

    /// Sets `hidden` on every dataset whose label is listed. Returns the
    /// number of datasets affected.
    pub fn set_hidden(&mut self, labels: &[&str], hidden: bool) -> usize {
        let mut changed = 0;
        for dataset in self.data.datasets.iter_mut() {
            if labels.contains(&dataset.label.as_str()) {
                dataset.hidden = hidden;
                changed += 1;
            }
        }
        changed
    }

    /// Applies a visibility checkbox. Known groups toggle their listed
    /// datasets; any other group name toggles datasets labelled with it as
    /// a prefix.
    pub fn set_group_hidden(&mut self, group: &str, hidden: bool) -> usize {
        let members = toggle_group(group);
        if !members.is_empty() {
            return self.set_hidden(members, hidden);
        }
        let mut changed = 0;
        for dataset in self.data.datasets.iter_mut() {
            if dataset.label.starts_with(group) {
                dataset.hidden = hidden;
                changed += 1;
            }
        }
        changed
    }

    /// Pins (or with `None`, releases) the range of an existing axis.
    pub fn set_axis_range(&mut self, id: AxisId, min: Option<f64>, max: Option<f64>) -> bool {
        match self.options.scales.get_mut(&id) {
            Some(axis) => {
                axis.min = min;
                axis.max = max;
                true
            }
            None => false,
        }
    }

    /// Range covering the listed datasets on the temperature axis padded
    /// by 5 degrees and rounded outwards.
    pub fn temperature_fit(&self, labels: &[&str]) -> Option<(f64, f64)> {
        let values = self
            .data
            .datasets
            .iter()
            .filter(|d| d.y_axis_id == Some(AxisId::Temperature) && labels.contains(&d.label.as_str()))
            .flat_map(|d| d.data.iter().flatten().copied())
            .filter(|v| v.is_finite());

        let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        if min.is_finite() && max.is_finite() {
            Some(((min - 5.0).floor(), (max + 5.0).ceil()))
        } else {
            None
        }
    }
}

/// Checkbox groups: a group name toggles all datasets listed for it.
pub const TOGGLE_GROUPS: [(&str, &[&str]); 13] = [
    ("Temp Range", &["Daily Temp Max", "Daily Temp Min", "Daily Temp Avg", "Temp Min", "Temp Max"]),
    (
        "Humidity Range",
        &["Daily Humidity Max", "Daily Humidity Min", "Avg Humidity (%)", "Humidity Min", "Humidity Max"],
    ),
    (
        "Light Range",
        &["Daily Light Max", "Daily Light Min", "Avg Light (lux)", "Light Min", "Light Max"],
    ),
    (
        "Soil Temp1 Range",
        &["Daily Soil Temp1 Max", "Daily Soil Temp1 Min", "Soil Temp1 Min", "Soil Temp1 Max"],
    ),
    (
        "Soil Temp2 Range",
        &["Daily Soil Temp2 Max", "Daily Soil Temp2 Min", "Soil Temp2 Min", "Soil Temp2 Max"],
    ),
    ("Soil Temp3 Range", &["Soil Temp3 Min", "Soil Temp3 Max"]),
    ("Soil Temp4 Range", &["Soil Temp4 Min", "Soil Temp4 Max"]),
    ("Fast Growth Range", &["Fast Growth Range Lower", "Fast Growth Range Upper"]),
    ("Slow Growth Range", &["Slow Growth Range Lower", "Slow Growth Range Upper"]),
    ("Hot Dormancy Range", &["Hot Dormancy Range Lower", "Hot Dormancy Range Upper"]),
    ("Cold Dormancy Range", &["Cold Dormancy Range Lower", "Cold Dormancy Range Upper"]),
    ("Lethal Limits", &["Lethal High", "Lethal Low"]),
    (
        "Soil Moisture",
        &[
            "Avg Soil Moisture",
            "Soil Moisture (Raw)",
            "Soil Moisture CH1 (pF)",
            "Soil Moisture CH2 (pF)",
            "Soil Moisture CH3 (pF)",
            "Soil Moisture CH4 (pF)",
        ],
    ),
];

/// Dataset labels toggled by a checkbox group; unknown groups match nothing.
pub fn toggle_group(name: &str) -> &'static [&'static str] {
    TOGGLE_GROUPS
        .iter()
        .find(|(group, _)| *group == name)
        .map(|(_, labels)| *labels)
        .unwrap_or(&[])
}

/// Series labels that count as temperature data for the Fit button.
pub const TEMPERATURE_FIT_LABELS: [&str; 24] = [
    "Temperature (°C)",
    "Temp Min",
    "Temp Max",
    "Soil Temp1 (°C)",
    "Soil Temp1 Min",
    "Soil Temp1 Max",
    "Soil Temp2 (°C)",
    "Soil Temp2 Min",
    "Soil Temp2 Max",
    "Soil Temp3 (°C)",
    "Soil Temp3 Min",
    "Soil Temp3 Max",
    "Soil Temp4 (°C)",
    "Soil Temp4 Min",
    "Soil Temp4 Max",
    "Daily Temp Avg",
    "Daily Temp Min",
    "Daily Temp Max",
    "Avg Soil Temp1 (°C)",
    "Daily Soil Temp1 Min",
    "Daily Soil Temp1 Max",
    "Avg Soil Temp2 (°C)",
    "Daily Soil Temp2 Min",
    "Daily Soil Temp2 Max",
];
