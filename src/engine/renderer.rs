use wasm_bindgen::prelude::*;
use web_sys::{WebGlBuffer, WebGlProgram, WebGlRenderingContext, WebGlUniformLocation};
use nalgebra::{Matrix4, Vector3};

use crate::engine::geometry::DrawBox;
use crate::engine::mesh::{Mesh, VERTEX_STRIDE};

const STRIDE_BYTES: i32 = (VERTEX_STRIDE * 4) as i32;

const VERTEX_SHADER: &str = r#"
    attribute vec3 aPosition;
    attribute vec3 aColor;
    uniform mat4 uModelViewProjection;
    varying vec3 vColor;
    varying vec3 vPos;
    void main() {
        gl_Position = uModelViewProjection * vec4(aPosition, 1.0);
        vPos = aPosition;
        vColor = aColor;
    }
"#;

const FRAGMENT_SHADER: &str = r#"
    precision mediump float;
    varying vec3 vColor;
    varying vec3 vPos;
    uniform vec3 uUniformColor;
    uniform bool uUseUniformColor;

    void main() {
        vec3 color = vColor;
        if (uUseUniformColor) {
            color *= uUniformColor;
        }

        // darker towards the bottom of each box
        float ao = smoothstep(-0.5, 0.5, vPos.y + 0.5);
        color *= mix(0.75, 1.0, ao);

        gl_FragColor = vec4(color, 1.0);
    }
"#;

pub struct Renderer {
    pub gl: WebGlRenderingContext,
    program: WebGlProgram,
    mvp_location: WebGlUniformLocation,
    u_uniform_color_location: WebGlUniformLocation,
    u_use_uniform_color_location: WebGlUniformLocation,
    unit_cube_vertex_buffer: WebGlBuffer,
    unit_cube_index_buffer: WebGlBuffer,
    unit_cube_index_count: i32,
    dynamic_vertex_buffer: WebGlBuffer,
    dynamic_index_buffer: WebGlBuffer,
}

impl Renderer {
    pub fn new(gl: WebGlRenderingContext) -> Result<Self, JsValue> {
        let program = create_program(&gl)?;
        gl.use_program(Some(&program));

        let dynamic_vertex_buffer = gl.create_buffer().ok_or("Failed to create buffer")?;
        let dynamic_index_buffer = gl.create_buffer().ok_or("Failed to create buffer")?;

        let mvp_location = gl.get_uniform_location(&program, "uModelViewProjection")
            .ok_or("Failed to get uniform location")?;
        let u_uniform_color_location = gl.get_uniform_location(&program, "uUniformColor")
            .ok_or("Failed to get uUniformColor location")?;
        let u_use_uniform_color_location = gl.get_uniform_location(&program, "uUseUniformColor")
            .ok_or("Failed to get uUseUniformColor location")?;

        let unit_cube_vertex_buffer = gl.create_buffer().ok_or("Failed to create unit cube buffer")?;
        let unit_cube_index_buffer = gl.create_buffer().ok_or("Failed to create unit cube index buffer")?;

        // White, so the uniform colour tints it directly
        let unit_cube = Mesh::cube(1.0, 1.0, 1.0);
        upload(&gl, &unit_cube_vertex_buffer, &unit_cube_index_buffer, &unit_cube);
        let unit_cube_index_count = unit_cube.indices.len() as i32;

        Ok(Renderer {
            gl,
            program,
            mvp_location,
            u_uniform_color_location,
            u_use_uniform_color_location,
            unit_cube_vertex_buffer,
            unit_cube_index_buffer,
            unit_cube_index_count,
            dynamic_vertex_buffer,
            dynamic_index_buffer,
        })
    }

    pub fn clear(&self, color: [f32; 3]) {
        self.gl.clear_color(color[0], color[1], color[2], 1.0);
        self.gl.clear(WebGlRenderingContext::COLOR_BUFFER_BIT | WebGlRenderingContext::DEPTH_BUFFER_BIT);
    }

    pub fn enable_depth_test(&self) {
        self.gl.enable(WebGlRenderingContext::DEPTH_TEST);
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width, height);
    }

    /// Draws `part` offset from an item sitting at `origin`.
    pub fn draw_box(&self, part: &DrawBox, origin: &Vector3<f32>, view_projection: &Matrix4<f32>) {
        self.gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(&self.unit_cube_vertex_buffer));
        self.gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(&self.unit_cube_index_buffer));
        self.bind_attributes();

        let [r, g, b] = part.color;
        self.gl.uniform1i(Some(&self.u_use_uniform_color_location), 1);
        self.gl.uniform3f(Some(&self.u_uniform_color_location), r, g, b);

        let model = Matrix4::new_translation(&(origin + part.center))
            * Matrix4::new_nonuniform_scaling(&part.size);
        self.set_mvp(&(view_projection * model));

        self.gl.draw_elements_with_i32(
            WebGlRenderingContext::TRIANGLES,
            self.unit_cube_index_count,
            WebGlRenderingContext::UNSIGNED_SHORT,
            0,
        );
    }

    pub fn draw_mesh(&self, mesh: &Mesh, position: &Vector3<f32>, scale: f32, view_projection: &Matrix4<f32>) {
        upload(&self.gl, &self.dynamic_vertex_buffer, &self.dynamic_index_buffer, mesh);
        self.bind_attributes();
        self.gl.uniform1i(Some(&self.u_use_uniform_color_location), 0);

        let model = Matrix4::new_translation(position) * Matrix4::new_scaling(scale);
        self.set_mvp(&(view_projection * model));

        self.gl.draw_elements_with_i32(
            WebGlRenderingContext::TRIANGLES,
            mesh.indices.len() as i32,
            WebGlRenderingContext::UNSIGNED_SHORT,
            0,
        );
    }

    fn bind_attributes(&self) {
        let pos_loc = self.gl.get_attrib_location(&self.program, "aPosition") as u32;
        let col_loc = self.gl.get_attrib_location(&self.program, "aColor") as u32;

        self.gl.vertex_attrib_pointer_with_i32(pos_loc, 3, WebGlRenderingContext::FLOAT, false, STRIDE_BYTES, 0);
        self.gl.enable_vertex_attrib_array(pos_loc);

        self.gl.vertex_attrib_pointer_with_i32(col_loc, 3, WebGlRenderingContext::FLOAT, false, STRIDE_BYTES, 12);
        self.gl.enable_vertex_attrib_array(col_loc);
    }

    fn set_mvp(&self, mvp: &Matrix4<f32>) {
        self.gl.uniform_matrix4fv_with_f32_array(Some(&self.mvp_location), false, mvp.as_slice());
    }
}

fn upload(gl: &WebGlRenderingContext, vertex_buffer: &WebGlBuffer, index_buffer: &WebGlBuffer, mesh: &Mesh) {
    gl.bind_buffer(WebGlRenderingContext::ARRAY_BUFFER, Some(vertex_buffer));
    unsafe {
        let vert_array = js_sys::Float32Array::view(&mesh.vertices);
        gl.buffer_data_with_array_buffer_view(
            WebGlRenderingContext::ARRAY_BUFFER,
            &vert_array,
            WebGlRenderingContext::STATIC_DRAW,
        );
    }

    gl.bind_buffer(WebGlRenderingContext::ELEMENT_ARRAY_BUFFER, Some(index_buffer));
    unsafe {
        let idx_array = js_sys::Uint16Array::view(&mesh.indices);
        gl.buffer_data_with_array_buffer_view(
            WebGlRenderingContext::ELEMENT_ARRAY_BUFFER,
            &idx_array,
            WebGlRenderingContext::STATIC_DRAW,
        );
    }
}

fn create_program(gl: &WebGlRenderingContext) -> Result<WebGlProgram, JsValue> {
    let vert_shader = compile_shader(gl, WebGlRenderingContext::VERTEX_SHADER, VERTEX_SHADER)?;
    let frag_shader = compile_shader(gl, WebGlRenderingContext::FRAGMENT_SHADER, FRAGMENT_SHADER)?;

    let program = gl.create_program().ok_or("Unable to create program")?;
    gl.attach_shader(&program, &vert_shader);
    gl.attach_shader(&program, &frag_shader);
    gl.link_program(&program);

    if gl.get_program_parameter(&program, WebGlRenderingContext::LINK_STATUS).as_bool().unwrap_or(false) {
        Ok(program)
    } else {
        Err(JsValue::from_str(&gl.get_program_info_log(&program).unwrap_or_default()))
    }
}

fn compile_shader(gl: &WebGlRenderingContext, shader_type: u32, source: &str) -> Result<web_sys::WebGlShader, JsValue> {
    let shader = gl.create_shader(shader_type).ok_or("Unable to create shader")?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl.get_shader_parameter(&shader, WebGlRenderingContext::COMPILE_STATUS).as_bool().unwrap_or(false) {
        Ok(shader)
    } else {
        Err(JsValue::from_str(&gl.get_shader_info_log(&shader).unwrap_or_default()))
    }
}
