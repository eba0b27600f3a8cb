use gpui::{
    App, Application, Bounds, Context, Entity, MouseButton, SharedString, Window, WindowBounds,
    WindowOptions, div, prelude::*, px, rgb, size,
};
use growfield::GrowingTextarea;
use tracing_subscriber::EnvFilter;

struct ChatComposer {
    composer: Entity<GrowingTextarea>,
    messages: Vec<SharedString>,
    status: SharedString,
}

impl ChatComposer {
    fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let composer = cx.new(|cx| {
            GrowingTextarea::new(window, cx)
                .id("chat-composer")
                .placeholder("Write a message")
                .minimum_lines(1)
                .maximum_lines(5)
                .on_did_change_height(|change| {
                    tracing::info!(from = change.from, to = change.to, "composer resized");
                })
        });

        Self {
            composer,
            messages: vec!["Type below; the field grows up to five lines.".into()],
            status: SharedString::default(),
        }
    }

    fn send(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        let text = self.composer.read(cx).text();
        if text.trim().is_empty() {
            return;
        }
        self.messages.push(text);
        self.status = format!("{} messages", self.messages.len()).into();
        self.composer
            .update(cx, |composer, cx| composer.set_text("", cx));
        window.refresh();
        cx.notify();
    }
}

impl Render for ChatComposer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(rgb(0xf4f5f7))
            .text_color(rgb(0x1f2328))
            .child(
                div()
                    .id("transcript")
                    .flex_1()
                    .flex()
                    .flex_col()
                    .gap_2()
                    .p_4()
                    .overflow_y_scroll()
                    .on_mouse_down(MouseButton::Left, |_, window, _| window.blur())
                    .children(self.messages.iter().cloned().map(|message| {
                        div()
                            .px_3()
                            .py_2()
                            .rounded(px(8.0))
                            .bg(rgb(0xffffff))
                            .child(message)
                    })),
            )
            .child(
                div()
                    .flex()
                    .items_end()
                    .gap_2()
                    .p_3()
                    .border_t_1()
                    .border_color(rgb(0xd0d4da))
                    .child(div().flex_1().child(self.composer.clone()))
                    .child(
                        div()
                            .id("send")
                            .px_3()
                            .py_1()
                            .rounded(px(6.0))
                            .bg(rgb(0x4c8bf5))
                            .text_color(rgb(0xffffff))
                            .cursor_pointer()
                            .on_click(cx.listener(|this, _, window, cx| this.send(window, cx)))
                            .child("Send"),
                    ),
            )
            .child(div().px_3().pb_2().text_sm().child(self.status.clone()))
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("growfield=debug")),
        )
        .init();

    Application::new().run(|cx: &mut App| {
        let bounds = Bounds::centered(None, size(px(420.0), px(560.0)), cx);
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(bounds)),
            ..Default::default()
        };
        if let Err(err) = cx.open_window(options, |window, cx| {
            cx.new(|cx| ChatComposer::new(window, cx))
        }) {
            tracing::error!(%err, "failed to open the chat composer window");
            cx.quit();
        }
        cx.activate(true);
    });
}
