use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub max_contacts: usize,
    pub scroll: ScrollConfig,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            max_contacts: 10,
            scroll: ScrollConfig::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub friction: f32,
    pub friction_factor: f32,
    pub velocity_snap: f32,
    pub fling_delay_ms: u64,
    pub drag_threshold: f32,
    pub wheel_speed: f32,
    pub scrollbar_fade_ms: u64,
    pub scrollbar_thickness: f32,
    pub scrollbar_margin: f32,
    pub scrollbar_min_thumb: f32,
}

impl ScrollConfig {
    pub fn fling_delay(&self) -> Duration {
        Duration::from_millis(self.fling_delay_ms)
    }

    pub fn scrollbar_fade(&self) -> Duration {
        Duration::from_millis(self.scrollbar_fade_ms)
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            friction: 1.0,
            friction_factor: 5.0,
            velocity_snap: 100.0,
            fling_delay_ms: 100,
            drag_threshold: 10.0,
            wheel_speed: 400.0,
            scrollbar_fade_ms: 1500,
            scrollbar_thickness: 6.0,
            scrollbar_margin: 3.0,
            scrollbar_min_thumb: 24.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::UiConfig;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: UiConfig =
            serde_json::from_str(r#"{ "scroll": { "friction": 2.5 } }"#).unwrap();
        assert_eq!(config.max_contacts, 10);
        assert_eq!(config.scroll.friction, 2.5);
        assert_eq!(config.scroll.fling_delay_ms, 100);
        assert_eq!(config.scroll.drag_threshold, 10.0);
    }
}
