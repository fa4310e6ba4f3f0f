use crate::constants::{AMBIENT_INTENSITY, HEMI_SKY_INTENSITY, KEY_LIGHT_DIR, KEY_LIGHT_INTENSITY};
use crate::core::mesh::{edge_indices, stale_keys};
use crate::core::scene::{Drawable, Geometry, Material, Scene};
use crate::xr::ViewParams;
use fnv::{FnvHashMap, FnvHasher};
use glam::{Mat4, Vec3};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{WebGl2RenderingContext as Gl, WebGlBuffer, WebGlProgram, WebGlUniformLocation};
use web_sys::{WebGlShader, WebGlVertexArrayObject};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
uniform mat4 u_model;
uniform mat4 u_view_proj;
out vec3 v_normal;
void main() {
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_proj * u_model * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
in vec3 v_normal;
uniform vec3 u_color;
uniform float u_opacity;
uniform float u_lit;
uniform vec3 u_light_dir;
uniform vec3 u_light;
out vec4 o_color;
void main() {
    vec3 n = normalize(v_normal);
    // x: ambient, y: key, z: sky
    float diffuse = max(dot(n, u_light_dir), 0.0) * u_light.y;
    float sky = (0.5 + 0.5 * n.y) * u_light.z;
    float shade = mix(1.0, u_light.x + diffuse + sky, u_lit);
    o_color = vec4(u_color * min(shade, 1.5), u_opacity);
}
"#;

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    buffers: [WebGlBuffer; 3],
    tri_count: i32,
    edge_vao: Option<(WebGlVertexArrayObject, WebGlBuffer, i32)>,
}

struct Uniforms {
    model: Option<WebGlUniformLocation>,
    view_proj: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    light_dir: Option<WebGlUniformLocation>,
    light: Option<WebGlUniformLocation>,
}

/// One queued draw, collected from the scene before any GL work.
struct DrawItem {
    key: u64,
    world: Mat4,
    drawable: Drawable,
}

/// Draws the retained [`Scene`] into the XR layer's framebuffer.
pub struct Renderer {
    gl: Gl,
    program: WebGlProgram,
    uniforms: Uniforms,
    meshes: FnvHashMap<u64, GpuMesh>,
}

fn compile(gl: &Gl, kind: u32, src: &str) -> anyhow::Result<WebGlShader> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| anyhow::anyhow!("create_shader failed"))?;
    gl.shader_source(&shader, src);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        Err(anyhow::anyhow!(
            "shader compile: {}",
            gl.get_shader_info_log(&shader).unwrap_or_default()
        ))
    }
}

fn geometry_key(g: &Geometry) -> u64 {
    match g {
        Geometry::Mesh(m) => Rc::as_ptr(m) as usize as u64,
        shape => {
            let mut h = FnvHasher::default();
            format!("{:?}", shape).hash(&mut h);
            // keep clear of pointer keys, which are aligned
            h.finish() | 1
        }
    }
}

impl Renderer {
    pub fn new(gl: Gl) -> anyhow::Result<Self> {
        let vs = compile(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = compile(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = gl
            .create_program()
            .ok_or_else(|| anyhow::anyhow!("create_program failed"))?;
        gl.attach_shader(&program, &vs);
        gl.attach_shader(&program, &fs);
        gl.link_program(&program);
        if !gl
            .get_program_parameter(&program, Gl::LINK_STATUS)
            .as_bool()
            .unwrap_or(false)
        {
            return Err(anyhow::anyhow!(
                "program link: {}",
                gl.get_program_info_log(&program).unwrap_or_default()
            ));
        }
        let u = |name: &str| gl.get_uniform_location(&program, name);
        let uniforms = Uniforms {
            model: u("u_model"),
            view_proj: u("u_view_proj"),
            color: u("u_color"),
            opacity: u("u_opacity"),
            lit: u("u_lit"),
            light_dir: u("u_light_dir"),
            light: u("u_light"),
        };
        log::info!("[render] WebGL2 program ready");
        Ok(Self {
            gl,
            program,
            uniforms,
            meshes: FnvHashMap::default(),
        })
    }

    /// Create the XR-compatible WebGL2 context for `canvas`.
    pub fn context_for(canvas: &web_sys::HtmlCanvasElement) -> anyhow::Result<Gl> {
        let opts = js_sys::Object::new();
        _ = js_sys::Reflect::set(&opts, &"xrCompatible".into(), &true.into());
        _ = js_sys::Reflect::set(&opts, &"alpha".into(), &true.into());
        _ = js_sys::Reflect::set(&opts, &"antialias".into(), &true.into());
        canvas
            .get_context_with_context_options("webgl2", &opts)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .ok_or_else(|| anyhow::anyhow!("WebGL2 unavailable"))?
            .dyn_into::<Gl>()
            .map_err(|e| anyhow::anyhow!("{:?}", e))
    }

    fn upload(&self, drawable: &Drawable) -> anyhow::Result<GpuMesh> {
        let gl = &self.gl;
        let mesh = drawable.geometry.tessellate();
        let flat = |v: &[[f32; 3]]| -> Vec<f32> { v.iter().flatten().copied().collect() };

        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| anyhow::anyhow!("create_vertex_array failed"))?;
        gl.bind_vertex_array(Some(&vao));
        let attrib = |loc: u32, data: &[f32]| -> anyhow::Result<WebGlBuffer> {
            let buf = gl
                .create_buffer()
                .ok_or_else(|| anyhow::anyhow!("create_buffer failed"))?;
            gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buf));
            gl.buffer_data_with_array_buffer_view(
                Gl::ARRAY_BUFFER,
                &js_sys::Float32Array::from(data),
                Gl::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(loc);
            gl.vertex_attrib_pointer_with_i32(loc, 3, Gl::FLOAT, false, 0, 0);
            Ok(buf)
        };
        let pos = attrib(0, &flat(&mesh.positions))?;
        let nrm = attrib(1, &flat(&mesh.normals))?;
        let index = |data: &[u32]| -> anyhow::Result<WebGlBuffer> {
            let buf = gl
                .create_buffer()
                .ok_or_else(|| anyhow::anyhow!("create_buffer failed"))?;
            gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&buf));
            gl.buffer_data_with_array_buffer_view(
                Gl::ELEMENT_ARRAY_BUFFER,
                &js_sys::Uint32Array::from(data),
                Gl::STATIC_DRAW,
            );
            Ok(buf)
        };
        let idx = index(&mesh.indices)?;

        let wireframe = matches!(drawable.material, Material::Basic(m) if m.wireframe);
        let edge_vao = if wireframe {
            let edges = edge_indices(&mesh.indices);
            let evao = gl
                .create_vertex_array()
                .ok_or_else(|| anyhow::anyhow!("create_vertex_array failed"))?;
            gl.bind_vertex_array(Some(&evao));
            for (loc, buf) in [(0, &pos), (1, &nrm)] {
                gl.bind_buffer(Gl::ARRAY_BUFFER, Some(buf));
                gl.enable_vertex_attrib_array(loc);
                gl.vertex_attrib_pointer_with_i32(loc, 3, Gl::FLOAT, false, 0, 0);
            }
            let ebuf = index(&edges)?;
            Some((evao, ebuf, edges.len() as i32))
        } else {
            None
        };
        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            buffers: [pos, nrm, idx],
            tri_count: mesh.indices.len() as i32,
            edge_vao,
        })
    }

    /// Drop GPU meshes whose scene nodes are gone.
    fn retain(&mut self, live: &[DrawItem]) {
        for key in stale_keys(self.meshes.keys(), live.iter().map(|d| d.key)) {
            let Some(m) = self.meshes.remove(&key) else {
                continue;
            };
            self.gl.delete_vertex_array(Some(&m.vao));
            for b in &m.buffers {
                self.gl.delete_buffer(Some(b));
            }
            if let Some((evao, ebuf, _)) = &m.edge_vao {
                self.gl.delete_vertex_array(Some(evao));
                self.gl.delete_buffer(Some(ebuf));
            }
        }
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        framebuffer: Option<&web_sys::WebGlFramebuffer>,
        views: &[ViewParams],
    ) {
        let mut items = Vec::new();
        scene.visit_visible(&mut |_, world, d| {
            items.push(DrawItem {
                key: geometry_key(&d.geometry),
                world: *world,
                drawable: d.clone(),
            })
        });
        // opaque before translucent
        items.sort_by_key(|d| matches!(d.drawable.material, Material::Basic(m) if m.transparent));

        for item in &items {
            if !self.meshes.contains_key(&item.key) {
                match self.upload(&item.drawable) {
                    Ok(m) => {
                        self.meshes.insert(item.key, m);
                    }
                    Err(e) => log::error!("[render] upload: {}", e),
                }
            }
        }
        self.retain(&items);

        let gl = &self.gl;
        gl.bind_framebuffer(Gl::FRAMEBUFFER, framebuffer);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        gl.enable(Gl::DEPTH_TEST);
        gl.use_program(Some(&self.program));

        let light_dir = Vec3::from_array(KEY_LIGHT_DIR).normalize_or_zero();
        gl.uniform3f(
            self.uniforms.light_dir.as_ref(),
            light_dir.x,
            light_dir.y,
            light_dir.z,
        );
        gl.uniform3f(
            self.uniforms.light.as_ref(),
            AMBIENT_INTENSITY,
            KEY_LIGHT_INTENSITY * 0.5,
            HEMI_SKY_INTENSITY * 0.3,
        );

        for view in views {
            let (x, y, w, h) = view.viewport;
            gl.viewport(x, y, w, h);
            gl.uniform_matrix4fv_with_f32_array(
                self.uniforms.view_proj.as_ref(),
                false,
                &view.view_proj.to_cols_array(),
            );
            for item in &items {
                if let Some(mesh) = self.meshes.get(&item.key) {
                    self.draw(mesh, item);
                }
            }
        }
        gl.disable(Gl::BLEND);
        gl.depth_mask(true);
        gl.bind_vertex_array(None);
    }

    fn draw(&self, mesh: &GpuMesh, item: &DrawItem) {
        let gl = &self.gl;
        let material = &item.drawable.material;
        let [r, g, b] = material.color();
        let (transparent, lit) = match material {
            Material::Physical(_) => (false, 1.0),
            Material::Basic(m) => (m.transparent, 0.0),
        };
        if transparent {
            gl.enable(Gl::BLEND);
            gl.blend_func(Gl::SRC_ALPHA, Gl::ONE_MINUS_SRC_ALPHA);
            gl.depth_mask(false);
        } else {
            gl.disable(Gl::BLEND);
            gl.depth_mask(true);
        }
        gl.uniform_matrix4fv_with_f32_array(
            self.uniforms.model.as_ref(),
            false,
            &item.world.to_cols_array(),
        );
        gl.uniform3f(self.uniforms.color.as_ref(), r, g, b);
        gl.uniform1f(self.uniforms.opacity.as_ref(), material.opacity());
        gl.uniform1f(self.uniforms.lit.as_ref(), lit);

        match &mesh.edge_vao {
            Some((evao, _, count)) => {
                gl.bind_vertex_array(Some(evao));
                gl.draw_elements_with_i32(Gl::LINES, *count, Gl::UNSIGNED_INT, 0);
            }
            None => {
                gl.bind_vertex_array(Some(&mesh.vao));
                gl.draw_elements_with_i32(Gl::TRIANGLES, mesh.tri_count, Gl::UNSIGNED_INT, 0);
            }
        }
    }
}
