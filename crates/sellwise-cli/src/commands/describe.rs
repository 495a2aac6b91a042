use anyhow::Result;
use sellwise_application::TaskKind;

pub fn show(kind: TaskKind) -> Result<()> {
    let definition = kind.definition();

    println!("{}", definition.name);
    println!("  {}", definition.description);
    println!();
    println!("Input fields:");
    for field in &definition.spec.fields {
        let marker = if field.required { "required" } else { "optional" };
        println!("  {:<20} {:<8} {}", field.name, marker, field.kind_label());
    }

    if let Some(stage) = &definition.media {
        println!();
        println!(
            "Media: {} generated from output field `{}`",
            stage.capability(),
            stage.prompt_field()
        );
    }

    println!();
    println!("Output schema:");
    println!(
        "{}",
        serde_json::to_string_pretty(&definition.output.to_json_schema())?
    );

    Ok(())
}
