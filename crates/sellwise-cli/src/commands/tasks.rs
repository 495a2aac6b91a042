use sellwise_application::TaskKind;

pub fn list() {
    let width = TaskKind::all()
        .map(|kind| kind.as_str().len())
        .max()
        .unwrap_or(0);

    for kind in TaskKind::all() {
        let definition = kind.definition();
        let media = match &definition.media {
            Some(stage) => format!(" [{}]", stage.capability()),
            None => String::new(),
        };
        println!(
            "{:<width$}  {}{}",
            kind.as_str(),
            definition.description,
            media,
            width = width
        );
    }
}
