//! Batch evaluation reports

use super::ensemble::Decision;
use super::gesture::GestureClass;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Per-class prediction counts over a batch of sequences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTally {
    counts: [usize; GestureClass::COUNT],
    no_gesture: usize,
    total: usize,
}

impl ClassTally {
    pub fn record(&mut self, decision: &Decision) {
        match decision.class() {
            Some(class) => self.counts[class.index()] += 1,
            None => self.no_gesture += 1,
        }
        self.total += 1;
    }

    pub fn count(&self, class: GestureClass) -> usize {
        self.counts[class.index()]
    }

    /// Sequences that produced no gesture
    pub fn no_gesture(&self) -> usize {
        self.no_gesture
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Share of the batch predicted as `class`, 0-100
    pub fn percentage(&self, class: GestureClass) -> f64 {
        percent(self.count(class), self.total)
    }

    /// The most frequent prediction, if any sequence produced one
    pub fn dominant(&self) -> Option<GestureClass> {
        GestureClass::ALL
            .iter()
            .copied()
            .filter(|c| self.count(*c) > 0)
            .fold(None, |best: Option<GestureClass>, c| match best {
                Some(b) if self.count(b) >= self.count(c) => Some(b),
                _ => Some(c),
            })
    }

    /// One line per class, then the no-gesture line when non-zero
    pub fn render(&self) -> String {
        let mut out = String::new();
        for class in GestureClass::ALL {
            let _ = writeln!(
                out,
                "{}: {} = {:.2}%",
                class.label(),
                self.count(class),
                self.percentage(class)
            );
        }
        if self.no_gesture > 0 {
            let _ = writeln!(
                out,
                "No gesture: {} = {:.2}%",
                self.no_gesture,
                percent(self.no_gesture, self.total)
            );
        }
        out
    }
}

/// Ground truth (rows) against prediction (columns)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    cells: [[usize; GestureClass::COUNT]; GestureClass::COUNT],
    no_gesture: [usize; GestureClass::COUNT],
}

impl ConfusionMatrix {
    /// Fold one class's tally into its row
    pub fn add(&mut self, truth: GestureClass, tally: &ClassTally) {
        let row = truth.index();
        for predicted in GestureClass::ALL {
            self.cells[row][predicted.index()] += tally.count(predicted);
        }
        self.no_gesture[row] += tally.no_gesture();
    }

    pub fn get(&self, truth: GestureClass, predicted: GestureClass) -> usize {
        self.cells[truth.index()][predicted.index()]
    }

    pub fn row_total(&self, truth: GestureClass) -> usize {
        let row = truth.index();
        self.cells[row].iter().sum::<usize>() + self.no_gesture[row]
    }

    /// Fraction of all sequences on the diagonal
    pub fn accuracy(&self) -> f64 {
        let correct: usize = GestureClass::ALL.iter().map(|c| self.get(*c, *c)).sum();
        let total: usize = GestureClass::ALL.iter().map(|c| self.row_total(*c)).sum();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        }
    }

    /// Fixed-width table with a percentage per cell
    pub fn render(&self) -> String {
        let width = 12;
        let mut out = String::new();

        let _ = write!(out, "{:<width$}", "");
        for class in GestureClass::ALL {
            let _ = write!(out, "{:>width$}", class.label());
        }
        let _ = writeln!(out, "{:>width$}", "None");

        for truth in GestureClass::ALL {
            let total = self.row_total(truth);
            let _ = write!(out, "{:<width$}", truth.label());
            for predicted in GestureClass::ALL {
                let cell = format!("{:.1}%", percent(self.get(truth, predicted), total));
                let _ = write!(out, "{:>width$}", cell);
            }
            let cell = format!("{:.1}%", percent(self.no_gesture[truth.index()], total));
            let _ = writeln!(out, "{:>width$}", cell);
        }

        let _ = writeln!(out, "Accuracy: {:.2}%", self.accuracy() * 100.0);
        out
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
