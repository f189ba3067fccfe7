//! Integration tests for damage accumulation and presentation on the
//! software display

use anyhow::Result;
use proptest::prelude::*;

use mithl_compositor::renderer::DamageTracker;
use mithl_compositor::{Color, GuiManager, MithlConfig, Rect, Renderer, SoftwareDisplay};

const RED: Color = Color(0xFFFF_0000);
const BLUE: Color = Color(0xFF00_00FF);

fn settled() -> Result<(GuiManager, SoftwareDisplay)> {
    let config = MithlConfig::default();
    let mut display = SoftwareDisplay::new(config.screen.width, config.screen.height)?;
    let mut gui = GuiManager::new(config)?;
    gui.run_frame(&mut display);
    Ok((gui, display))
}

#[test]
fn test_first_frame_presents_whole_screen() -> Result<()> {
    let config = MithlConfig::default();
    let background = config.theme.background;
    let mut display = SoftwareDisplay::new(1024, 768)?;
    let mut gui = GuiManager::new(config)?;

    let report = gui.run_frame(&mut display);
    assert_eq!(report.presented, Some(Rect::new(0, 0, 1024, 768)));
    assert_eq!(display.front_pixel(0, 0), Some(background));
    assert_eq!(display.front_pixel(1023, 767), Some(background));
    assert!(!gui.needs_redraw());
    Ok(())
}

#[test]
fn test_present_copies_exactly_the_dirty_rect() -> Result<()> {
    let (mut gui, mut display) = settled()?;
    let background = gui.config().theme.background;

    // Scribble over the whole off-screen buffer behind the compositor's back
    display.fill_rect(Rect::new(0, 0, 1024, 768), RED);

    let dirty = Rect::new(100, 100, 50, 40);
    gui.invalidate(dirty);
    assert_eq!(gui.present(&mut display), Some(dirty));

    assert_eq!(display.front_pixel(100, 100), Some(RED));
    assert_eq!(display.front_pixel(149, 139), Some(RED));
    assert_eq!(display.front_pixel(99, 100), Some(background));
    assert_eq!(display.front_pixel(150, 100), Some(background));
    assert_eq!(display.front_pixel(100, 140), Some(background));
    assert!(!gui.needs_redraw());

    // Nothing new was invalidated, so nothing is copied
    display.fill_rect(Rect::new(0, 0, 1024, 768), BLUE);
    assert_eq!(gui.present(&mut display), None);
    assert_eq!(display.front_pixel(120, 120), Some(RED));
    assert_eq!(display.front_pixel(0, 0), Some(background));
    Ok(())
}

#[test]
fn test_invalidate_empty_rect_is_a_no_op() -> Result<()> {
    let (mut gui, mut display) = settled()?;
    gui.invalidate(Rect::new(10, 10, 0, 50));
    gui.invalidate(Rect::EMPTY);
    assert!(!gui.needs_redraw());
    assert_eq!(gui.run_frame(&mut display).presented, None);
    Ok(())
}

#[test]
fn test_window_paint_is_clipped_to_damage() -> Result<()> {
    let (mut gui, mut display) = settled()?;
    let theme = gui.config().theme.clone();

    let w = gui.create_window("Editor", Rect::new(100, 100, 200, 150));
    let report = gui.run_frame(&mut display);
    assert_eq!(report.presented, Some(Rect::new(100, 100, 200, 150)));

    // Title bar and body are visible, the desktop around the window is not
    // touched
    assert_eq!(display.front_pixel(105, 102), Some(theme.title_bar));
    assert_eq!(display.front_pixel(105, 200), Some(theme.window_body));
    assert_eq!(display.front_pixel(99, 200), Some(theme.background));

    gui.set_position(w, 400, 100)?;
    gui.run_frame(&mut display);
    assert_eq!(display.front_pixel(105, 200), Some(theme.background));
    assert_eq!(display.front_pixel(405, 200), Some(theme.window_body));
    Ok(())
}

#[test]
fn test_background_painter_swap_reaches_the_screen() -> Result<()> {
    let (mut gui, mut display) = settled()?;
    let theme = gui.config().theme.clone();
    gui.create_window("Editor", Rect::new(100, 100, 200, 150));
    gui.run_frame(&mut display);

    gui.set_background_painter(Box::new(|renderer: &mut dyn Renderer, area: Rect| {
        renderer.fill_rect(area, BLUE)
    }));

    let report = gui.run_frame(&mut display);
    assert_eq!(report.background, Some(Rect::new(0, 0, 1024, 768)));
    assert_eq!(report.presented, Some(Rect::new(0, 0, 1024, 768)));
    assert_eq!(display.front_pixel(10, 10), Some(BLUE));
    assert_eq!(display.front_pixel(500, 500), Some(BLUE));

    // The window survives the new base layer, on screen and off
    assert_eq!(display.front_pixel(105, 200), Some(theme.window_body));
    assert_eq!(display.back_pixel(105, 200), Some(theme.window_body));
    assert!(!gui.needs_redraw());
    Ok(())
}

fn rect() -> impl Strategy<Value = Rect> {
    (-500i32..500, -500i32..500, 0i32..400, 0i32..400).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn non_empty_rect() -> impl Strategy<Value = Rect> {
    (-500i32..500, -500i32..500, 1i32..400, 1i32..400).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

proptest! {
    #[test]
    fn prop_union_is_idempotent(a in rect(), b in rect()) {
        let ab = a.union(&b);
        prop_assert_eq!(ab.union(&b), ab);
    }

    #[test]
    fn prop_empty_is_union_identity(a in non_empty_rect()) {
        prop_assert_eq!(a.union(&Rect::EMPTY), a);
        prop_assert_eq!(Rect::EMPTY.union(&a), a);
    }

    #[test]
    fn prop_union_covers_both_operands(a in rect(), b in rect()) {
        let ab = a.union(&b);
        prop_assert!(ab.contains_rect(&a));
        prop_assert!(ab.contains_rect(&b));
        if !a.is_empty() || !b.is_empty() {
            prop_assert_eq!(ab, b.union(&a));
        }
    }

    #[test]
    fn prop_tracker_covers_every_invalidation(rects in prop::collection::vec(rect(), 0..12)) {
        let mut damage = DamageTracker::new();
        for r in &rects {
            damage.invalidate(*r);
        }
        for r in &rects {
            prop_assert!(damage.content().contains_rect(r));
            prop_assert!(damage.background().contains_rect(r));
        }
        prop_assert_eq!(
            damage.has_content_damage(),
            rects.iter().any(|r| !r.is_empty())
        );
    }
}
