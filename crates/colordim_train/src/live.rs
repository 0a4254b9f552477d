//! Live chart sinks for per-epoch histogram curves.

use std::sync::mpsc::{self, Receiver, Sender};

use colordim_core::Phase;

use crate::summary::Curve;

/// Receives the curves computed at the end of every epoch.
///
/// Implementations must not block the training loop: rendering either
/// happens inline and quickly, or the curves are handed off elsewhere.
pub trait LiveChart: Send + Sync {
    /// Replace the displayed curves.
    fn update_graph(&mut self, curves: &[Curve]);
}

/// Terminal chart of the histogram curves.
///
/// Rows are bins (upper bound at the top), columns are mean counts. Training
/// curves are drawn with `█`, validation curves with `░`.
///
/// # Example
///
/// ```rust,ignore
/// use colordim_train::{ActivationsHistogram, AsciiLiveChart};
///
/// let recorder = ActivationsHistogram::new(&model, config)?
///     .with_live_chart(AsciiLiveChart::new().with_width(60).with_height(20));
/// ```
pub struct AsciiLiveChart {
    /// Chart width in characters.
    width: usize,
    /// Chart height in characters.
    height: usize,
    /// Whether to emit ANSI colors.
    color: bool,
}

impl Default for AsciiLiveChart {
    fn default() -> Self {
        Self {
            width: 50,
            height: 16,
            color: true,
        }
    }
}

impl AsciiLiveChart {
    /// Create a chart with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chart width in characters.
    #[must_use]
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    /// Set the chart height in characters.
    #[must_use]
    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height.max(5);
        self
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Render the curves into a string.
    pub fn render(&self, curves: &[Curve]) -> String {
        let curves: Vec<&Curve> = curves.iter().filter(|c| !c.is_empty()).collect();
        if curves.is_empty() {
            return String::new();
        }

        let min_x = curves
            .iter()
            .flat_map(|c| c.x.iter().copied())
            .fold(f32::INFINITY, f32::min);
        let max_x = curves
            .iter()
            .flat_map(|c| c.x.iter().copied())
            .fold(f32::NEG_INFINITY, f32::max);
        let range = (max_x - min_x).max(1e-6);

        let mut grid = vec![vec![' '; self.width]; self.height];
        for curve in &curves {
            let glyph = match curve.phase {
                Phase::Train => '█',
                Phase::Valid => '░',
            };
            let n = curve.len();
            for (row, cells) in grid.iter_mut().enumerate() {
                // Top row shows the last bin.
                let bin = (self.height - 1 - row) * n / self.height;
                let normalized = (curve.x[bin] - min_x) / range;
                let col = ((normalized * (self.width - 1) as f32) as usize).min(self.width - 1);
                if cells[col] == ' ' || glyph == '█' {
                    cells[col] = glyph;
                }
            }
        }

        let (color_start, color_end) = if self.color {
            ("\x1b[33m", "\x1b[0m")
        } else {
            ("", "")
        };
        let first = curves[0];
        let y_top = first.y.last().copied().unwrap_or_default();
        let y_bottom = first.y.first().copied().unwrap_or_default();

        let mut output = String::new();
        let label = "Activations (last layer)";
        output.push_str(&format!("┌─ {} ", label));
        output.push_str(&"─".repeat(self.width.saturating_sub(label.len() + 4)));
        output.push_str("┐\n");

        for (i, row) in grid.iter().enumerate() {
            if i == 0 {
                output.push_str(&format!("│{:>6.2} ", y_top));
            } else if i == self.height - 1 {
                output.push_str(&format!("│{:>6.2} ", y_bottom));
            } else {
                output.push_str("│       ");
            }
            output.push_str(color_start);
            output.extend(row.iter());
            output.push_str(color_end);
            output.push_str("│\n");
        }

        output.push_str("└───────");
        output.push_str(&"─".repeat(self.width));
        output.push_str("┘\n");
        output.push_str(&format!("        Mean count: {:.1} → {:.1}\n", min_x, max_x));
        output
    }
}

impl LiveChart for AsciiLiveChart {
    fn update_graph(&mut self, curves: &[Curve]) {
        print!("{}", self.render(curves));
    }
}

/// Forwards curves over a channel, e.g. to a UI thread.
///
/// Sending never blocks; curves are dropped once the receiver is gone.
pub struct ChannelLiveChart {
    sender: Sender<Vec<Curve>>,
}

impl ChannelLiveChart {
    /// Create a sink and the receiver that gets every update.
    pub fn new() -> (Self, Receiver<Vec<Curve>>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl LiveChart for ChannelLiveChart {
    fn update_graph(&mut self, curves: &[Curve]) {
        if self.sender.send(curves.to_vec()).is_err() {
            tracing::debug!("Live chart receiver dropped, discarding curves");
        }
    }
}
