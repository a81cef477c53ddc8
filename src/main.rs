use freehand_poly::{
    dbg_store, EngineBuilder, GeoClipper, HeadlessRenderer, Mode, Options, PlanePoint,
};

/// Samples a closed stroke around the rectangle `(x, y)`..`(x + w, y + h)`.
fn stroke(x: f64, y: f64, w: f64, h: f64) -> Vec<PlanePoint> {
    let mut points = Vec::new();
    for i in 0..10 {
        points.push(PlanePoint::new(x + w * i as f64 / 10.0, y));
    }
    for i in 0..10 {
        points.push(PlanePoint::new(x + w, y + h * i as f64 / 10.0));
    }
    for i in 0..10 {
        points.push(PlanePoint::new(x + w - w * i as f64 / 10.0, y + h));
    }
    for i in 0..10 {
        points.push(PlanePoint::new(x, y + h - h * i as f64 / 10.0));
    }
    points
}

pub fn main() {
    tracing_subscriber::fmt()
        .pretty()
        // enable everything
        .with_max_level(tracing::Level::TRACE)
        // sets this to be the default, global collector for this application.
        .init();

    let options = match Options::builder().mode(Mode::ALL).build() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };
    let mut engine = match EngineBuilder::new(options)
        .renderer(HeadlessRenderer::default())
        .clipper(GeoClipper)
        .build()
    {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("{}", err);
            return;
        }
    };
    engine.subscribe(|event| println!("event: {:?}", event));

    for (x, y) in [(0.0, 0.0), (60.0, 60.0), (300.0, 0.0)] {
        let mut points = stroke(x, y, 100.0, 100.0).into_iter();
        if let Some(first) = points.next() {
            engine.pointer_down(first);
        }
        for point in points {
            engine.pointer_move(point);
        }
        engine.pointer_up();
    }
    println!("{:#?}", dbg_store!(engine.store()));

    engine.undo();
    println!("after undo: {:#?}", dbg_store!(engine.store()));
    engine.redo();
    println!("after redo: {:#?}", dbg_store!(engine.store()));
}
