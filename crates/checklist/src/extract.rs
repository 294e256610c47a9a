//! Defect list and progress figures, from one depth-first walk.

use serde::{Deserialize, Serialize};

use crate::semantics::{
    defect_detail, is_complete, is_defective, is_touched, reported_present, reported_works,
};
use crate::tree::ChecklistTree;

/// A finding that an item failed its type-specific check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Defect {
    /// Section names from the main section down to the item's section.
    pub path: Vec<String>,
    pub name: String,
    pub is_present: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub works: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Defect {
    /// `"Cab > Glovebox > Torch: missing"`.
    pub fn summary_line(&self) -> String {
        let mut line = self.path.join(" > ");
        if !line.is_empty() {
            line.push_str(" > ");
        }
        line.push_str(&self.name);
        if let Some(detail) = &self.detail {
            line.push_str(": ");
            line.push_str(detail);
        }
        line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub total_items: usize,
    pub completed_items: usize,
    pub touched_items: usize,
    pub percent_complete: u8,
}

impl Progress {
    fn finish(mut self) -> Self {
        self.percent_complete = percent(self.completed_items, self.total_items);
        self
    }
}

/// Rounded percentage, half up; 0 when there is nothing to count.
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = done.min(total);
    ((200 * done + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Findings {
    pub defects: Vec<Defect>,
    pub progress: Progress,
}

pub fn extract(tree: &ChecklistTree) -> Findings {
    let mut defects = Vec::new();
    let mut progress = Progress::default();

    tree.visit_items(|path, item| {
        progress.total_items += 1;
        if is_complete(item) {
            progress.completed_items += 1;
        }
        if is_touched(item) {
            progress.touched_items += 1;
        }
        if is_defective(item) {
            defects.push(Defect {
                path: path.iter().map(|s| s.to_string()).collect(),
                name: item.name.clone(),
                is_present: reported_present(item),
                works: reported_works(item),
                detail: defect_detail(item),
            });
        }
    });

    Findings {
        defects,
        progress: progress.finish(),
    }
}
