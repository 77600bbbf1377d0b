/// egui rendering: side panel filters, top bar, charts, tabs and tables.
pub mod panels;
pub mod plot;
pub mod table;
pub mod tabs;
