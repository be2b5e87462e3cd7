// Radar chart geometry for the ward livability ratings; drawn as SVG by the page template

use crate::profile::RadarData;
use std::f64::consts::PI;

pub const SIZE: f64 = 420.0;
const RADIUS: f64 = 150.0;

/// Position of `value` on axis `index`, first axis pointing straight up.
fn point(index: usize, count: usize, value: f64, range: (f64, f64)) -> (f64, f64) {
    let span = range.1 - range.0;
    let fraction = if span > 0.0 {
        ((value - range.0) / span).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let angle = 2.0 * PI * index as f64 / count as f64 - PI / 2.0;
    let center = SIZE / 2.0;
    (
        center + RADIUS * fraction * angle.cos(),
        center + RADIUS * fraction * angle.sin(),
    )
}

fn points<I: Iterator<Item = (f64, f64)>>(coords: I) -> String {
    coords
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spoke {
    pub x: f64,
    pub y: f64,
    pub label_x: f64,
    pub label_y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RadarChart {
    pub size: f64,
    pub center: f64,
    /// One `points` attribute per whole step of the range.
    pub rings: Vec<String>,
    pub spokes: Vec<Spoke>,
    pub shape: String,
}

impl RadarChart {
    /// `None` when there is nothing to plot.
    pub fn build(data: &RadarData) -> Option<Self> {
        let count = data.axes.len();
        if count == 0 {
            return None;
        }

        let steps = (data.range.1 - data.range.0).round().max(1.0) as usize;
        let rings = (1..=steps)
            .map(|step| {
                let value = data.range.0 + step as f64;
                points((0..count).map(|i| point(i, count, value, data.range)))
            })
            .collect();

        let center = SIZE / 2.0;
        let spokes = data.axes.iter().enumerate()
            .map(|(i, name)| {
                let (x, y) = point(i, count, data.range.1, data.range);
                Spoke {
                    x,
                    y,
                    label_x: center + (x - center) * 1.18,
                    label_y: center + (y - center) * 1.12,
                    label: name.clone(),
                }
            })
            .collect();

        let shape = points(data.values.iter().enumerate().map(|(i, v)| point(i, count, *v, data.range)));

        Some(Self { size: SIZE, center, rings, spokes, shape })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(values: Vec<f64>) -> RadarData {
        RadarData {
            axes: (0..values.len()).map(|i| format!("項目{i}")).collect(),
            values,
            range: (0.0, 5.0),
        }
    }

    #[test]
    fn first_axis_points_up() {
        let (x, y) = point(0, 4, 5.0, (0.0, 5.0));
        assert!((x - SIZE / 2.0).abs() < 1e-9);
        assert!((y - (SIZE / 2.0 - RADIUS)).abs() < 1e-9);
    }

    #[test]
    fn values_are_clamped_to_range() {
        assert_eq!(point(1, 4, 9.0, (0.0, 5.0)), point(1, 4, 5.0, (0.0, 5.0)));
        assert_eq!(point(1, 4, -1.0, (0.0, 5.0)), (SIZE / 2.0, SIZE / 2.0));
    }

    #[test]
    fn chart_has_grid_rings_and_labelled_spokes() {
        let chart = RadarChart::build(&data(vec![3.0, 4.5, 2.0, 5.0, 1.5, 3.3, 4.0])).unwrap();
        assert_eq!(chart.rings.len(), 5);
        assert_eq!(chart.spokes.len(), 7);
        assert_eq!(chart.spokes[6].label, "項目6");
        assert_eq!(chart.shape.split(' ').count(), 7);
        // full value on the fourth axis sits on the outer ring
        let outer: Vec<&str> = chart.rings[4].split(' ').collect();
        assert_eq!(chart.shape.split(' ').nth(3), Some(outer[3]));
    }

    #[test]
    fn empty_axes_give_no_chart() {
        assert_eq!(RadarChart::build(&data(vec![])), None);
    }
}
