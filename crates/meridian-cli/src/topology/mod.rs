pub mod mesh2d;
pub mod point_to_point;
