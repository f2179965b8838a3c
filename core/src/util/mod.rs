pub mod extend_rect;
