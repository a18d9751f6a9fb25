pub mod alert;
pub mod api;
pub mod busy;
pub mod cards;
pub mod chart_view;
pub mod charts;
pub mod controllers;
pub mod document;
pub mod feed;
pub mod router;

#[cfg(test)]
pub(crate) mod testing;
