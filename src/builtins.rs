//! Built-in transform catalog seeded into a registry at process start.
//!
//! Every input declares a default, so a one-step pipeline built from any
//! of these compiles with no arguments at all.

use crate::transform::{GlslType, InputSpec, LiteralValue, TransformDef};

fn float(name: &str, default: f64) -> InputSpec {
    InputSpec::new(name, GlslType::Float).with_default(LiteralValue::Float(default))
}

fn texture(name: &str, default_handle: &str) -> InputSpec {
    InputSpec::new(name, GlslType::Texture)
        .with_default(LiteralValue::Texture(default_handle.to_string()))
}

pub fn catalog() -> Vec<TransformDef> {
    let mut defs = Vec::new();
    defs.extend(sources());
    defs.extend(coordinates());
    defs.extend(colors());
    defs.extend(combines());
    defs.extend(combine_coords());
    defs
}

fn sources() -> Vec<TransformDef> {
    vec![
        TransformDef::new(
            "osc",
            "src",
            "vec2 st = _st;
float r = sin((st.x - offset / freq + time * sync) * freq) * 0.5 + 0.5;
float g = sin((st.x + time * sync) * freq) * 0.5 + 0.5;
float b = sin((st.x + offset / freq + time * sync) * freq) * 0.5 + 0.5;
return vec4(r, g, b, 1.0);",
        )
        .input(float("freq", 60.0))
        .input(float("sync", 0.1))
        .input(float("offset", 0.0)),
        TransformDef::new(
            "noise",
            "src",
            "return vec4(vec3(_noise(vec3(_st * scale, offset * time))), 1.0);",
        )
        .input(float("scale", 10.0))
        .input(float("offset", 0.1)),
        TransformDef::new(
            "voronoi",
            "src",
            "vec3 color = vec3(0.0);
vec2 st = _st * scale;
vec2 i_st = floor(st);
vec2 f_st = fract(st);
float m_dist = 10.0;
vec2 m_point;
for (int j = -1; j <= 1; j++) {
  for (int i = -1; i <= 1; i++) {
    vec2 neighbor = vec2(float(i), float(j));
    vec2 p = i_st + neighbor;
    vec2 point = fract(sin(vec2(dot(p, vec2(127.1, 311.7)), dot(p, vec2(269.5, 183.3)))) * 43758.5453);
    point = 0.5 + 0.5 * sin(time * speed + 6.2831 * point);
    vec2 diff = neighbor + point - f_st;
    float dist = length(diff);
    if (dist < m_dist) {
      m_dist = dist;
      m_point = point;
    }
  }
}
color += dot(m_point, vec2(0.3, 0.6));
color *= 1.0 - blending * m_dist;
return vec4(color, 1.0);",
        )
        .input(float("scale", 5.0))
        .input(float("speed", 0.3))
        .input(float("blending", 0.3)),
        TransformDef::new("gradient", "src", "return vec4(_st, sin(time * speed), 1.0);")
            .input(float("speed", 0.0)),
        TransformDef::new(
            "shape",
            "src",
            "vec2 st = _st * 2.0 - 1.0;
float a = atan(st.x, st.y) + 3.1416;
float r = (2.0 * 3.1416) / sides;
float d = cos(floor(0.5 + a / r) * r - a) * length(st);
return vec4(vec3(1.0 - smoothstep(radius, radius + smoothing, d)), 1.0);",
        )
        .input(float("sides", 3.0))
        .input(float("radius", 0.3))
        .input(float("smoothing", 0.01)),
        TransformDef::new("solid", "src", "return vec4(r, g, b, a);")
            .input(float("r", 0.0))
            .input(float("g", 0.0))
            .input(float("b", 0.0))
            .input(float("a", 1.0)),
        TransformDef::new("src", "src", "return texture2D(tex, fract(_st));")
            .input(texture("tex", "tex0")),
    ]
}

fn coordinates() -> Vec<TransformDef> {
    vec![
        TransformDef::new(
            "rotate",
            "coord",
            "vec2 xy = _st - vec2(0.5);
float ang = angle + speed * time;
xy = mat2(cos(ang), -sin(ang), sin(ang), cos(ang)) * xy;
xy += 0.5;
return xy;",
        )
        .input(float("angle", 10.0))
        .input(float("speed", 0.0)),
        TransformDef::new(
            "scale",
            "coord",
            "vec2 xy = _st - vec2(offsetX, offsetY);
xy *= (1.0 / vec2(amount * xMult, amount * yMult));
xy += vec2(offsetX, offsetY);
return xy;",
        )
        .input(float("amount", 1.5))
        .input(float("xMult", 1.0))
        .input(float("yMult", 1.0))
        .input(float("offsetX", 0.5))
        .input(float("offsetY", 0.5)),
        TransformDef::new(
            "pixelate",
            "coord",
            "vec2 xy = vec2(pixelX, pixelY);
return (floor(_st * xy) + 0.5) / xy;",
        )
        .input(float("pixelX", 20.0))
        .input(float("pixelY", 20.0)),
        TransformDef::new(
            "repeat",
            "coord",
            "vec2 st = _st * vec2(repeatX, repeatY);
st.x += step(1.0, mod(st.y, 2.0)) * offsetX;
st.y += step(1.0, mod(st.x, 2.0)) * offsetY;
return fract(st);",
        )
        .input(float("repeatX", 3.0))
        .input(float("repeatY", 3.0))
        .input(float("offsetX", 0.0))
        .input(float("offsetY", 0.0)),
        TransformDef::new(
            "kaleid",
            "coord",
            "vec2 st = _st - 0.5;
float r = length(st);
float a = atan(st.y, st.x);
float pi = 2.0 * 3.1416;
a = mod(a, pi / nSides);
a = abs(a - pi / nSides / 2.0);
return r * vec2(cos(a), sin(a));",
        )
        .input(float("nSides", 4.0)),
    ]
}

fn colors() -> Vec<TransformDef> {
    vec![
        TransformDef::new(
            "invert",
            "color",
            "return vec4((1.0 - _c0.rgb) * amount + _c0.rgb * (1.0 - amount), _c0.a);",
        )
        .input(float("amount", 1.0)),
        TransformDef::new(
            "contrast",
            "color",
            "vec4 c = (_c0 - vec4(0.5)) * vec4(amount) + vec4(0.5);
return vec4(c.rgb, _c0.a);",
        )
        .input(float("amount", 1.6)),
        TransformDef::new(
            "brightness",
            "color",
            "return vec4(_c0.rgb + vec3(amount), _c0.a);",
        )
        .input(float("amount", 0.4)),
        TransformDef::new(
            "luma",
            "color",
            "float a = smoothstep(threshold - tolerance, threshold + tolerance, _luminance(_c0.rgb));
return vec4(_c0.rgb * a, a);",
        )
        .input(float("threshold", 0.5))
        .input(float("tolerance", 0.1)),
        TransformDef::new(
            "saturate",
            "color",
            "const vec3 W = vec3(0.2125, 0.7154, 0.0721);
vec3 intensity = vec3(dot(_c0.rgb, W));
return vec4(mix(intensity, _c0.rgb, amount), _c0.a);",
        )
        .input(float("amount", 2.0)),
        TransformDef::new(
            "posterize",
            "color",
            "vec4 c2 = pow(_c0, vec4(gamma));
c2 *= vec4(bins);
c2 = floor(c2);
c2 /= vec4(bins);
c2 = pow(c2, vec4(1.0 / gamma));
return vec4(c2.xyz, _c0.a);",
        )
        .input(float("bins", 3.0))
        .input(float("gamma", 0.6)),
        TransformDef::new(
            "color",
            "color",
            "vec4 c = vec4(r, g, b, a);
vec3 pos = step(0.0, c.rgb);
return vec4(mix((1.0 - _c0.rgb) * abs(c.rgb), c.rgb * _c0.rgb, pos), _c0.a * a);",
        )
        .input(float("r", 1.0))
        .input(float("g", 1.0))
        .input(float("b", 1.0))
        .input(float("a", 1.0)),
        TransformDef::new(
            "colorama",
            "color",
            "vec4 c = vec4(_rgbToHsv(_c0.rgb), _c0.a);
c += vec4(amount);
c = vec4(_hsvToRgb(c.rgb), c.a);
c = fract(c);
return c;",
        )
        .input(float("amount", 0.005)),
    ]
}

fn combines() -> Vec<TransformDef> {
    vec![
        TransformDef::new(
            "add",
            "combine",
            "return (_c0 + _c1) * amount + _c0 * (1.0 - amount);",
        )
        .input(float("amount", 1.0)),
        TransformDef::new(
            "sub",
            "combine",
            "return (_c0 - _c1) * amount + _c0 * (1.0 - amount);",
        )
        .input(float("amount", 1.0)),
        TransformDef::new(
            "mult",
            "combine",
            "return _c0 * (1.0 - amount) + (_c0 * _c1) * amount;",
        )
        .input(float("amount", 1.0)),
        TransformDef::new("blend", "combine", "return _c0 * (1.0 - amount) + _c1 * amount;")
            .input(float("amount", 0.5)),
        TransformDef::new(
            "diff",
            "combine",
            "return vec4(abs(_c0.rgb - _c1.rgb), max(_c0.a, _c1.a));",
        ),
        TransformDef::new(
            "layer",
            "combine",
            "return vec4(mix(_c0.rgb, _c1.rgb, _c1.a), _c0.a + _c1.a);",
        ),
        TransformDef::new(
            "mask",
            "combine",
            "float a = _luminance(_c1.rgb);
return vec4(_c0.rgb * a, a * _c0.a);",
        ),
    ]
}

fn combine_coords() -> Vec<TransformDef> {
    vec![
        TransformDef::new("modulate", "combineCoord", "return _st + _c0.xy * amount;")
            .input(float("amount", 0.1)),
        TransformDef::new(
            "modulateScale",
            "combineCoord",
            "vec2 xy = _st - vec2(0.5);
xy *= (1.0 / vec2(offset + multiple * _c0.r, offset + multiple * _c0.g));
xy += vec2(0.5);
return xy;",
        )
        .input(float("multiple", 1.0))
        .input(float("offset", 1.0)),
        TransformDef::new(
            "modulateRotate",
            "combineCoord",
            "vec2 xy = _st - vec2(0.5);
float ang = offset + _c0.x * multiple;
xy = mat2(cos(ang), -sin(ang), sin(ang), cos(ang)) * xy;
xy += 0.5;
return xy;",
        )
        .input(float("multiple", 1.0))
        .input(float("offset", 0.0)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_validates_and_has_unique_names() {
        let defs = catalog();
        let mut names = std::collections::BTreeSet::new();
        for def in &defs {
            def.validate().unwrap();
            assert!(names.insert(def.name.clone()), "duplicate '{}'", def.name);
        }
        assert!(defs.len() >= 20);
    }

    #[test]
    fn every_declared_input_has_a_default() {
        for def in catalog() {
            for input in &def.inputs {
                assert!(
                    input.default.is_some(),
                    "built-in '{}' input '{}' lacks a default",
                    def.name,
                    input.name
                );
            }
        }
    }
}
