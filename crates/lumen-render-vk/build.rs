use std::{env, fs, path::PathBuf};

fn main() {
    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR"));

    // Vertex layout matches geometry::Vertex:
    //   location 0: R32G32B32_SFLOAT (pos)
    //   location 1: R32G32B32_SFLOAT (color)
    //   location 2: R32G32_SFLOAT    (uv)
    // gl_InstanceIndex includes firstInstance, so draw i reads objects[i].
    let vs_src = r#"
#version 450
layout(set = 0, binding = 0) uniform Camera {
    mat4 model;
    mat4 view;
    mat4 proj;
} ubo;

struct ObjectData {
    vec4 position;
};

layout(std430, set = 0, binding = 2) readonly buffer Objects {
    ObjectData objects[];
};

layout(location = 0) in vec3 inPos;
layout(location = 1) in vec3 inColor;
layout(location = 2) in vec2 inUv;

layout(location = 0) out vec3 vColor;
layout(location = 1) out vec2 vUv;

void main() {
    vec4 world = ubo.model * vec4(inPos, 1.0);
    world.xyz += objects[gl_InstanceIndex].position.xyz;
    gl_Position = ubo.proj * ubo.view * world;
    vColor = inColor;
    vUv = inUv;
}
"#;

    let fs_src = r#"
#version 450
layout(set = 0, binding = 1) uniform sampler2D tex;

layout(location = 0) in vec3 vColor;
layout(location = 1) in vec2 vUv;

layout(location = 0) out vec4 outColor;

void main() {
    outColor = vec4(vColor, 1.0) * texture(tex, vUv);
}
"#;

    let comp = shaderc::Compiler::new().expect("shaderc compiler");
    let mut opts = shaderc::CompileOptions::new().expect("shaderc options");
    opts.set_target_env(
        shaderc::TargetEnv::Vulkan,
        shaderc::EnvVersion::Vulkan1_0 as u32,
    );
    opts.set_optimization_level(shaderc::OptimizationLevel::Performance);

    let vs_spv = comp
        .compile_into_spirv(
            vs_src,
            shaderc::ShaderKind::Vertex,
            "cube.vert",
            "main",
            Some(&opts),
        )
        .expect("compile cube.vert");
    let fs_spv = comp
        .compile_into_spirv(
            fs_src,
            shaderc::ShaderKind::Fragment,
            "cube.frag",
            "main",
            Some(&opts),
        )
        .expect("compile cube.frag");

    fs::write(out.join("vert.spv"), vs_spv.as_binary_u8()).expect("write vert.spv");
    fs::write(out.join("frag.spv"), fs_spv.as_binary_u8()).expect("write frag.spv");

    println!("cargo:rerun-if-changed=build.rs");
}
