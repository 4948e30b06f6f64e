//! Per-frame draw list
//!
//! The world is reduced to a flat list of primitives in painter's order. The
//! GPU pipeline consumes it, and it is what tests look at instead of pixels.

use glam::Vec2;

use super::theme::{Color, Theme};
use crate::sim::World;

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole arena
    Fill { size: Vec2, color: Color },
    Rect { origin: Vec2, size: Vec2, color: Color },
    Circle { center: Vec2, radius: f32, color: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelStyle {
    Title,
    Subtitle,
}

/// Static text drawn over the arena, top-centred
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub color: Color,
    pub style: LabelStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    pub labels: Vec<Label>,
}

impl Scene {
    /// Build the frame: background, every obstacle in order, then the ball.
    /// Nothing is drawn until the arena has been measured.
    pub fn build(world: &World, theme: &Theme) -> Self {
        let labels = vec![
            Label {
                text: theme.title_text.clone(),
                color: theme.title,
                style: LabelStyle::Title,
            },
            Label {
                text: theme.subtitle_text.clone(),
                color: theme.subtitle,
                style: LabelStyle::Subtitle,
            },
        ];

        let Some(size) = world.bounds else {
            return Self {
                commands: Vec::new(),
                labels,
            };
        };

        let mut commands = Vec::with_capacity(world.obstacles.len() + 2);
        commands.push(DrawCommand::Fill {
            size,
            color: theme.arena,
        });
        commands.extend(world.obstacles.iter().map(|o| DrawCommand::Rect {
            origin: o.origin,
            size: o.size,
            color: theme.obstacle,
        }));
        commands.push(DrawCommand::Circle {
            center: world.ball.pos,
            radius: world.ball.radius,
            color: theme.ball,
        });

        Self { commands, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_until_measured() {
        let world = World::default();
        let scene = Scene::build(&world, &Theme::default());
        assert!(scene.commands.is_empty());
        assert_eq!(scene.labels.len(), 2);
    }

    #[test]
    fn test_painter_order() {
        let mut world = World::default();
        world.set_bounds(720.0, 1280.0);
        let theme = Theme::default();
        let scene = Scene::build(&world, &theme);

        assert_eq!(scene.commands.len(), world.obstacles.len() + 2);
        assert!(matches!(
            scene.commands.first(),
            Some(DrawCommand::Fill { size, .. }) if *size == Vec2::new(720.0, 1280.0)
        ));
        assert_eq!(
            scene.commands[1],
            DrawCommand::Rect {
                origin: Vec2::new(80.0, 260.0),
                size: Vec2::new(360.0, 32.0),
                color: theme.obstacle,
            }
        );
        assert_eq!(
            scene.commands.last(),
            Some(&DrawCommand::Circle {
                center: Vec2::new(220.0, 220.0),
                radius: 38.0,
                color: theme.ball,
            })
        );
    }

    #[test]
    fn test_labels() {
        let scene = Scene::build(&World::default(), &Theme::default());
        assert_eq!(scene.labels[0].text, "Tilt to roll the ball");
        assert_eq!(scene.labels[0].style, LabelStyle::Title);
        assert_eq!(scene.labels[1].text, "Avoid the neon walls");
        assert_eq!(scene.labels[1].style, LabelStyle::Subtitle);
    }
}
