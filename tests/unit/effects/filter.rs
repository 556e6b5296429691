use std::sync::Mutex;

use super::*;

#[derive(Debug, Default)]
struct Recorder {
    tag: &'static str,
    log: Arc<Mutex<Vec<(String, f64)>>>,
}

impl Filter for Recorder {
    fn name(&self) -> &str {
        self.tag
    }

    fn process(&self, raster: &mut Raster, scale: f64) -> MosaicResult<()> {
        self.log
            .lock()
            .unwrap()
            .push((self.tag.to_owned(), scale));
        for v in &mut raster.pixels {
            *v += 1.0;
        }
        Ok(())
    }
}

#[test]
fn stages_run_in_order_with_the_given_scale() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let pipeline = FilterPipeline::new()
        .with_stage(Recorder {
            tag: "first",
            log: Arc::clone(&log),
        })
        .with_stage(Recorder {
            tag: "second",
            log: Arc::clone(&log),
        });
    assert_eq!(pipeline.names(), ["first", "second"]);

    let mut r = Raster::new(2, 1);
    pipeline.apply(&mut r, 0.25).unwrap();
    assert_eq!(r.pixels, vec![2.0, 2.0]);
    assert_eq!(
        *log.lock().unwrap(),
        vec![("first".to_owned(), 0.25), ("second".to_owned(), 0.25)]
    );
}

#[test]
fn value_to_noise_replaces_only_matching_pixels() {
    let mut r = Raster::from_pixels(4, 4, vec![0.0; 16]).unwrap();
    r.set(1, 1, 100.0);
    ValueToNoise::new(0.0, 64.0, 191.0).process(&mut r, 1.0).unwrap();

    assert_eq!(r.get(1, 1), 100.0);
    for (i, v) in r.pixels.iter().enumerate() {
        if i != 5 {
            assert!((64.0..=191.0).contains(v), "pixel {i} = {v}");
            assert_eq!(v.fract(), 0.0);
        }
    }
}

#[test]
fn value_to_noise_is_deterministic_per_seed() {
    let run = |seed| {
        let mut r = Raster::new(8, 8);
        ValueToNoise::new(0.0, 0.0, 1000.0)
            .with_seed(seed)
            .process(&mut r, 1.0)
            .unwrap();
        r
    };
    assert_eq!(run(1), run(1));
    assert_ne!(run(1), run(2));
}

#[test]
fn invalid_noise_range_is_reported_with_filter_name() {
    let p = FilterPipeline::new().with_stage(ValueToNoise::new(0.0, 10.0, 5.0));
    let err = p.apply(&mut Raster::new(1, 1), 1.0).unwrap_err();
    assert!(matches!(err, MosaicError::Validation(_)));
    assert!(err.to_string().contains("value_to_noise"));
}

#[test]
fn alignment_default_noises_black_and_white() {
    let p = FilterPipeline::alignment_default();
    assert_eq!(p.len(), 2);

    let mut r = Raster::from_pixels(3, 1, vec![0.0, 255.0, 100.0]).unwrap();
    p.apply(&mut r, 0.5).unwrap();
    assert!((64.0..=191.0).contains(&r.pixels[0]));
    assert!((64.0..=191.0).contains(&r.pixels[1]));
    assert_eq!(r.pixels[2], 100.0);
}
