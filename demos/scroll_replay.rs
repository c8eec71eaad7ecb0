use strata::{
    DrawResult, FrameData, LayerTreeHost, LayerTreeSettings, NullClient, Point, RenderPass,
    Renderer, RendererCapabilities, ScrollInputType, Size, TreeDescription, Vec2,
};

struct PrintRenderer;

impl Renderer for PrintRenderer {
    fn capabilities(&self) -> RendererCapabilities {
        RendererCapabilities::default()
    }

    fn submit_frame(&mut self, passes: &[RenderPass], frame_time: std::time::Duration) {
        let quads: usize = passes.iter().map(|p| p.quads.len()).sum();
        println!("  submitted {} passes, {quads} quads at {frame_time:?}", passes.len());
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let s = include_str!("../tests/data/viewport_tree.json");
    let desc = TreeDescription::from_json(s)?;

    let mut host = LayerTreeHost::new(LayerTreeSettings::default(), NullClient)?;
    anyhow::ensure!(host.initialize_renderer(Box::new(PrintRenderer)), "renderer failed to start");
    host.set_viewport_size(Size::new(50.0, 50.0));
    host.commit_description(&desc)?;
    host.activate_pending_tree();

    let at = Point::new(10.0, 10.0);
    host.scroll_begin(at, ScrollInputType::Gesture);
    for step in 0..4 {
        host.scroll_by(at, Vec2::new(0.0, 15.0));
        let mut frame = FrameData::default();
        let result = host.prepare_to_draw(&mut frame);
        println!(
            "step {step}: offset {:?}, {result:?}",
            host.active_tree().total_scroll_offset()
        );
        if result == DrawResult::Success {
            host.draw_layers(&frame, std::time::Duration::from_millis(16 * step));
        }
        host.did_draw_all_layers(&frame);
    }
    host.scroll_end();

    let deltas = host.process_scroll_deltas();
    println!("{}", serde_json::to_string_pretty(&deltas)?);
    print!("{}", host.active_tree().dump());
    Ok(())
}
