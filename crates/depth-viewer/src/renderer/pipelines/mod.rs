pub mod point_cloud;
