use image::{Rgba, RgbaImage};
use spritemill::{
    AnimKey,
    frames::{collect_animations, plan_batch},
};

fn write_frame(dir: &std::path::Path, name: &str) {
    RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))
        .save(dir.join(name))
        .unwrap();
}

#[test]
fn scan_groups_and_orders_frames_by_trailing_index() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "Alex_Walking_2.png");
    write_frame(dir.path(), "Alex_Walking_0.png");
    write_frame(dir.path(), "Alex_Walking_10.png");
    write_frame(dir.path(), "Alex_Walking_1.png");
    write_frame(dir.path(), "Ryan_Hurt_0.png");

    let groups = collect_animations(dir.path()).unwrap();
    assert_eq!(groups.len(), 2);

    let indices: Vec<u32> = groups["Alex_Walking"].iter().map(|f| f.index).collect();
    // Numeric, not lexical: 10 sorts after 2.
    assert_eq!(indices, vec![0, 1, 2, 10]);
}

#[test]
fn missing_allow_listed_key_does_not_block_the_rest_of_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "Alex_Walking_0.png");

    let groups = collect_animations(dir.path()).unwrap();
    let allowed = vec![
        AnimKey::new("Ryan", "Kicking"),
        AnimKey::new("Alex", "Walking"),
    ];
    let plan = plan_batch(&groups, &allowed);

    assert_eq!(plan.missing, vec!["Ryan_Kicking".to_string()]);
    assert_eq!(plan.jobs.len(), 1);
    assert_eq!(plan.jobs[0].0, "Alex_Walking");
}

#[test]
fn malformed_frame_name_fails_the_whole_scan() {
    let dir = tempfile::tempdir().unwrap();
    write_frame(dir.path(), "Alex_Walking_0.png");
    write_frame(dir.path(), "thumbnail.png");

    let err = collect_animations(dir.path()).unwrap_err();
    assert!(err.to_string().contains("thumbnail"));
}
