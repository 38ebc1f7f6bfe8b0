use shadow_rs::ShadowBuilder;

fn main() {
    // Git and toolchain metadata behind `courier --version`
    ShadowBuilder::builder()
        .build()
        .expect("Failed to generate build metadata");
}
