use crate::data::PointRecord;
use crate::scene::PlotEvent;

pub struct UiState {
    pub data_name: String,

    pub show_labels: bool,
    pub show_help: bool,

    pub selected: Option<(usize, PointRecord)>,
    pub last_error: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            data_name: String::new(),

            show_labels: true,
            show_help: true,

            selected: None,
            last_error: None,
        }
    }
}

impl UiState {
    pub fn apply_event(&mut self, event: PlotEvent) {
        match event {
            PlotEvent::Select { index, point } => self.selected = Some((index, point)),
            PlotEvent::Deselect => self.selected = None,
        }
    }
}
