pub mod dialogs;
pub mod gantt_chart;
pub mod project_table;
pub mod rows;
pub mod theme;
pub mod toolbar;
