pub mod calendar;
pub mod todo;

pub use calendar::CalendarView;
pub use todo::TodoView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    grab_dx: i32,
    grab_dy: i32,
}

impl DragState {
    pub fn begin(cursor_x: i32, cursor_y: i32, window_x: i32, window_y: i32) -> Self {
        Self {
            grab_dx: cursor_x - window_x,
            grab_dy: cursor_y - window_y,
        }
    }

    pub fn position_for(&self, cursor_x: i32, cursor_y: i32) -> (i32, i32) {
        (cursor_x - self.grab_dx, cursor_y - self.grab_dy)
    }
}
