//! UI module - small widgets shared by the sidebar, table and editor

pub mod components;
