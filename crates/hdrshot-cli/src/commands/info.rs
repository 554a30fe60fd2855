//! Info command: container metadata and full-decode statistics.

use crate::InfoArgs;
use anyhow::Result;
use hdrshot_convert::analyze::{analyze_image, Analysis};
use hdrshot_core::Cicp;
use hdrshot_io::{avif, exr, hdr, png, Format};
use serde_json::{json, Map, Value};

pub fn run(args: InfoArgs) -> Result<()> {
    let bytes = super::read_input(&args.input)?;
    let format = Format::detect(&args.input, &bytes);

    let mut fields = Map::new();
    fields.insert("file".into(), json!(args.input.display().to_string()));
    fields.insert("format".into(), json!(format.to_string()));
    fields.insert("mime".into(), json!(format.mime_type()));
    fields.insert("size".into(), json!(bytes.len()));
    let analysis = describe(format, &bytes, &mut fields)?;
    if let Some(a) = &analysis {
        fields.insert("statistics".into(), serde_json::to_value(a)?);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&Value::Object(fields))?);
    } else {
        print_text(&fields, analysis.as_ref());
    }
    Ok(())
}

fn cicp_json(cicp: Option<Cicp>) -> Value {
    match cicp {
        Some(c) => json!({
            "primaries": c.primaries,
            "transfer": c.transfer,
            "matrix": c.matrix,
            "full_range": c.full_range,
        }),
        None => Value::Null,
    }
}

/// Adds format-specific fields; returns statistics when the pixels can be
/// decoded here.
fn describe(format: Format, bytes: &[u8], fields: &mut Map<String, Value>) -> Result<Option<Analysis>> {
    match format {
        Format::Png => {
            let info = png::read_info(bytes)?;
            fields.insert("width".into(), json!(info.width));
            fields.insert("height".into(), json!(info.height));
            fields.insert("bit_depth".into(), json!(info.bit_depth));
            fields.insert("color_type".into(), json!(format!("{:?}", info.color_type)));
            fields.insert("interlaced".into(), json!(info.interlaced));
            fields.insert("cicp".into(), cicp_json(info.cicp));
            Ok(png::decode(bytes).ok().map(|image| analyze_image(&image)))
        }
        Format::Avif => {
            let meta = avif::read_metadata(bytes);
            if let Some((w, h)) = meta.dimensions {
                fields.insert("width".into(), json!(w));
                fields.insert("height".into(), json!(h));
            }
            fields.insert("bit_depth".into(), json!(meta.bit_depth));
            fields.insert("cicp".into(), cicp_json(meta.cicp));
            fields.insert("sdr".into(), json!(meta.is_sdr()));
            if let Some(hint) = meta.luminance_hint() {
                fields.insert("declared_luminance".into(), serde_json::to_value(hint)?);
            }
            Ok(None)
        }
        Format::Exr => {
            let header = exr::read_header(bytes)?;
            fields.insert("width".into(), json!(header.width()));
            fields.insert("height".into(), json!(header.height()));
            fields.insert("compression".into(), json!(format!("{:?}", header.compression)));
            let channels: Vec<Value> = header
                .channels
                .iter()
                .map(|c| json!({ "name": c.name, "type": format!("{:?}", c.pixel_type) }))
                .collect();
            fields.insert("channels".into(), Value::Array(channels));
            Ok(Some(analyze_image(&exr::decode(bytes)?)))
        }
        Format::Hdr => {
            let header = hdr::read_header(&mut &bytes[..])?;
            fields.insert("width".into(), json!(header.width));
            fields.insert("height".into(), json!(header.height));
            fields.insert("program".into(), json!(header.program));
            fields.insert("pixel_format".into(), json!(header.format));
            fields.insert("exposure".into(), json!(header.exposure));
            Ok(Some(analyze_image(&hdr::decode(bytes)?)))
        }
        Format::Jxr | Format::Unknown => Ok(None),
    }
}

fn print_text(fields: &Map<String, Value>, analysis: Option<&Analysis>) {
    for (key, value) in fields {
        if key == "statistics" {
            continue;
        }
        let shown = match value {
            Value::String(s) => s.clone(),
            Value::Null => "-".into(),
            other => other.to_string(),
        };
        if key == "size" {
            let size = value.as_u64().map_or(shown, super::format_size);
            println!("  {key:<18} {size}");
        } else {
            println!("  {key:<18} {shown}");
        }
    }
    if let Some(a) = analysis {
        let l = &a.luminance;
        println!("  {:<18} {:.1} nits", "MaxCLL", l.max_cll);
        println!(
            "  {:<18} max {:.1}, avg {:.2}, min {:.4} nits",
            "Luminance", l.max_luminance, l.avg_luminance, l.min_luminance
        );
        let g = &a.gamut;
        println!(
            "  {:<18} rec709 {:.2}%, p3 {:.2}%, bt2020 {:.2}%, ap1 {:.2}%, ap0 {:.2}%, beyond {:.2}%",
            "Gamut", g.rec709, g.p3, g.bt2020, g.ap1, g.ap0, g.beyond
        );
    }
}
