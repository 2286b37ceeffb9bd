pub mod class;
pub mod gui;
pub mod layout;
pub mod logging;
pub mod media;
pub mod settings;
pub mod storage;
pub mod theme;
pub mod whiteboard;
pub mod widgets;
