pub mod track_canvas;
