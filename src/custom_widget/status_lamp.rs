use iced::{
    Border, Color, Element, Length, Shadow, Size,
    advanced::{self, Widget, layout::Node},
};

use crate::session::Status;

/// Round indicator colored after the session status.
pub struct StatusLamp {
    status: Status,
    diameter: f32,
}

impl StatusLamp {
    pub fn diameter(mut self, diameter: f32) -> Self {
        self.diameter = diameter;
        self
    }

    fn color(&self) -> Color {
        match self.status {
            Status::Idle => Color::from_rgb8(0x8d, 0x8d, 0x8d),
            Status::Recording => Color::from_rgb8(0xda, 0x1e, 0x28),
            Status::Playing => Color::from_rgb8(0x24, 0xa1, 0x48),
        }
    }
}

pub fn status_lamp(status: Status) -> StatusLamp {
    StatusLamp {
        status,
        diameter: 10.0,
    }
}

impl<M, T, R> From<StatusLamp> for Element<'_, M, T, R>
where
    R: advanced::renderer::Renderer,
{
    fn from(lamp: StatusLamp) -> Self {
        Self::new(lamp)
    }
}

impl<M, T, R> Widget<M, T, R> for StatusLamp
where
    R: advanced::renderer::Renderer,
{
    fn size(&self) -> Size<Length> {
        Size::new(Length::Fixed(self.diameter), Length::Fixed(self.diameter))
    }

    fn layout(
        &self,
        _tree: &mut advanced::widget::Tree,
        _renderer: &R,
        _limits: &advanced::layout::Limits,
    ) -> advanced::layout::Node {
        Node::new(Size::new(self.diameter, self.diameter))
    }

    fn draw(
        &self,
        _tree: &advanced::widget::Tree,
        renderer: &mut R,
        _theme: &T,
        _style: &advanced::renderer::Style,
        layout: advanced::Layout<'_>,
        _cursor: advanced::mouse::Cursor,
        _viewport: &iced::Rectangle,
    ) {
        renderer.fill_quad(
            advanced::renderer::Quad {
                bounds: layout.bounds(),
                border: Border {
                    radius: (self.diameter / 2.0).into(),
                    ..Border::default()
                },
                shadow: Shadow::default(),
            },
            self.color(),
        );
    }
}
