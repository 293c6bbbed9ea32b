mod edge_index;
mod synthetic;
