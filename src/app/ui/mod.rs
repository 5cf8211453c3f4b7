mod panels;
mod summary;
