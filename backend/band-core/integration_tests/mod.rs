mod helpers;

mod forward;
mod lifecycle;
mod pipe;
